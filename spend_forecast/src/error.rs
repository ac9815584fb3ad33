//! Error types for the spend_forecast crate

use spend_math::MathError;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the spend_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Not enough monthly history to build a feature window
    #[error("Not enough data: {0}")]
    InsufficientData(String),

    /// The persisted model artifact could not be loaded
    #[error("Model unavailable at {}: {reason}", path.display())]
    ModelUnavailable { path: PathBuf, reason: String },

    /// Training produced no rows, so nothing was fitted or written
    #[error("Training data is empty: no category has enough monthly history")]
    TrainingDataEmpty,

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    Data(String),

    /// Error related to forecasting operations
    #[error("Forecasting error: {0}")]
    Forecasting(String),

    /// Error from the regression
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from (de)serializing the model artifact
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error from reading CSV input
    #[error("CSV error: {0}")]
    Csv(String),
}

impl ForecastError {
    /// Whether this is the expected "not enough history" outcome
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, ForecastError::InsufficientData(_))
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::Csv(err.to_string())
    }
}

/// Failures of the external suggestion generator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SuggestionError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("generator returned HTTP status {0}")]
    Status(u16),

    #[error("generator returned an empty completion")]
    EmptyResponse,
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
