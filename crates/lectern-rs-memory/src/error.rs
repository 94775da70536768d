//! Error types for the memory engine.

/// Errors returned by the vector store and memory components.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Vector length does not match the store dimension.
    #[error("vector dimension mismatch (expected={expected}, actual={actual})")]
    Dimension { expected: usize, actual: usize },
    /// Row cannot be stored or decoded.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    /// Scalar filter is malformed.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    /// Existing table does not match the expected layout.
    #[error("schema error: {0}")]
    Schema(String),
    /// Capture pattern failed to compile.
    #[error("regex error: {0}")]
    Regex(String),
    /// Embedding provider failed.
    #[error("embedding error: {0}")]
    Embedding(String),
}
