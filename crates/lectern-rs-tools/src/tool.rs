//! Tool trait and the metadata shown to callers.

use crate::context::ToolContext;
use crate::error::ToolError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;

/// Tool metadata for discovery and schema presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema for the `args` object.
    pub args_schema: Value,
}

/// A single engine operation callable with JSON arguments.
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema for tool arguments.
    fn args_schema(&self) -> Value;

    /// Invoke the tool with a context and arguments.
    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError>;

    /// Build a `ToolSpec` describing this tool.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            args_schema: self.args_schema(),
        }
    }
}
