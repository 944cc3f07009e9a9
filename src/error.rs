use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Question bank error: {0}")]
    Bank(#[from] BankError),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a positive number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum BankError {
    #[error("Failed to read question bank: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse question bank: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Question bank must be a JSON array of questions")]
    NotAnArray,

    #[error("Question bank has no usable questions")]
    Empty,
}

/// Why a single question record was skipped.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is not an object")]
    NotAnObject,

    #[error("record has no {0} field")]
    MissingField(&'static str),
}
