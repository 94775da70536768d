use lectern_rs_memory::MemoryError;

/// Errors returned by tools and the registry.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Tool name was not found in registry.
    #[error("tool not found: {0}")]
    ToolNotFound(String),
    /// Tool received invalid arguments.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// Tool execution failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<MemoryError> for ToolError {
    fn from(err: MemoryError) -> Self {
        match err {
            MemoryError::InvalidRecord(message) | MemoryError::InvalidFilter(message) => {
                ToolError::InvalidArguments(message)
            }
            other => ToolError::ExecutionFailed(other.to_string()),
        }
    }
}
