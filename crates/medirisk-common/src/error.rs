use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediriskError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    #[error("Feature schema violation: expected {expected} values, got {actual}")]
    SchemaViolation { expected: usize, actual: usize },

    #[error("Model unavailable ({model}): {reason}")]
    ModelUnavailable { model: String, reason: String },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MediriskError>;
