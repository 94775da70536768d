//! Helpers shared by built-in tools.

use crate::ToolError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse JSON args into a typed struct. `null` is read as `{}`.
pub(super) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|err| ToolError::InvalidArguments(err.to_string()))
}

/// Serialize a tool result.
pub(super) fn to_output<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|err| ToolError::ExecutionFailed(err.to_string()))
}

/// Reject blank required string arguments.
pub(super) fn require_text(field: &str, value: &str) -> Result<(), ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidArguments(format!("{field} cannot be empty")));
    }
    Ok(())
}
