use thiserror::Error;

/// Failure while loading or checking a Lectern config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
    /// File is not valid JSON5.
    #[error("config is not valid json5: {0}")]
    Parse(#[from] json5::Error),
    /// Merged document does not fit the config model.
    #[error("config does not match the model: {0}")]
    Decode(#[from] serde_json::Error),
    /// A field failed the schema check; `path` is `layer:dotted.path`.
    #[error("invalid config field {path}: {message}")]
    InvalidField { path: String, message: String },
    /// A semantic constraint was violated.
    #[error("invalid config: {0}")]
    Invalid(String),
}
