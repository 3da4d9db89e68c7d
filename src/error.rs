//! Error handling for the resume ranker

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document '{name}' is unreadable: {reason}")]
    DocumentUnreadable { name: String, reason: String },

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    Export(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, RankerError>;

/// Transport, TLS and decoding failures of the model endpoint all mean the
/// model could not be consulted.
impl From<reqwest::Error> for RankerError {
    fn from(err: reqwest::Error) -> Self {
        RankerError::ModelUnavailable(err.to_string())
    }
}

impl RankerError {
    pub fn unreadable(name: impl Into<String>, reason: impl ToString) -> Self {
        RankerError::DocumentUnreadable {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}
