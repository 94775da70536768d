//! Tool adapters exposing the Lectern memory engine to agents.

pub mod builtins;
pub mod context;
pub mod error;
pub mod output_policy;
pub mod registry;
pub mod tool;

/// Built-in tool registry and registration helper.
pub use builtins::{builtin_tool_registry, register_builtin_tools};
/// Tool context handed to every call.
pub use context::ToolContext;
/// Tool error type.
pub use error::ToolError;
/// Tool output policy.
pub use output_policy::ToolOutputPolicy;
/// Tool registry type.
pub use registry::ToolRegistry;
/// Tool trait and spec type.
pub use tool::{Tool, ToolSpec};
