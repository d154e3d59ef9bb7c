//! Domain-specific error types for bmi-coach

use thiserror::Error;

use crate::measurement::FieldError;

/// Main error type for the BMI advisory pipeline.
///
/// Every variant is recoverable within a single interaction; nothing here is
/// fatal to the process.
#[derive(Error, Debug)]
pub enum CoachError {
    #[error("Validation error: {}", .errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join(" "))]
    Validation { errors: Vec<FieldError> },

    #[error("Invalid calculation: {message}")]
    Calculation { message: String },

    #[error("Recommendation error: {message}")]
    Recommendation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<anyhow::Error> for CoachError {
    fn from(err: anyhow::Error) -> Self {
        CoachError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoachError {
    fn from(err: serde_json::Error) -> Self {
        CoachError::Internal {
            message: format!("serialization error: {}", err),
        }
    }
}

impl From<reqwest::Error> for CoachError {
    fn from(err: reqwest::Error) -> Self {
        CoachError::Recommendation {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, CoachError>;
