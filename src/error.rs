//! Error type shared by the engine and its collaborators
//!
//! None of these errors is recoverable: each signals defective product data,
//! an invalid policy input, or a logic defect, and aborts the illustration.
//! The helper constructors log the message before it propagates so that the
//! offending key, value, or product is always on record.

use thiserror::Error;

use crate::numeric::{CastError, RoundingError};

#[derive(Debug, Error)]
pub enum IllustrationError {
    /// Unsupported enumerator, missing datum, or inconsistent product data
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Policy input that the product does not permit
    #[error("validation error: {0}")]
    Validation(String),

    #[error("numeric conversion error: {0}")]
    NumericConversion(#[source] CastError),

    #[error("rounding error: {0}")]
    Rounding(#[source] RoundingError),

    /// An operation that has no meaning for the requested strategy
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The table provider cannot supply a requested table or range
    #[error("table error: {0}")]
    Table(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IllustrationError {
    pub fn configuration(message: impl Into<String>) -> Self {
        let message = message.into();
        log::error!("{}", message);
        Self::Configuration(message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        log::error!("{}", message);
        Self::Validation(message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        let message = message.into();
        log::error!("{}", message);
        Self::UnsupportedOperation(message)
    }

    pub fn table(message: impl Into<String>) -> Self {
        let message = message.into();
        log::error!("{}", message);
        Self::Table(message)
    }
}

impl From<CastError> for IllustrationError {
    fn from(e: CastError) -> Self {
        log::error!("Numeric conversion failed: {}", e);
        Self::NumericConversion(e)
    }
}

impl From<RoundingError> for IllustrationError {
    fn from(e: RoundingError) -> Self {
        log::error!("Rounding failed: {}", e);
        Self::Rounding(e)
    }
}

pub type Result<T> = std::result::Result<T, IllustrationError>;
