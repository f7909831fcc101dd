//! Error types shared across the library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    /// Pension inputs that must be present were absent or zero
    #[error("missing required fields: {}", .fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    /// Pension arithmetic left the representable range
    #[error("{field} out of range")]
    AmountOutOfRange { field: &'static str },

    #[error("invalid retirement age for {key}: {value}")]
    InvalidAge { key: String, value: String },

    #[error("invalid pension tier table: {0}")]
    InvalidTierTable(String),

    #[error("unknown count category: {0}")]
    UnknownCategory(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RecordError {
    /// Whether the error stems from caller input rather than the environment
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RecordError::MissingFields { .. }
                | RecordError::AmountOutOfRange { .. }
                | RecordError::InvalidAge { .. }
                | RecordError::UnknownCategory(_)
                | RecordError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RecordError>;
