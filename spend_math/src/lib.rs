//! # Spend Math
//!
//! Numeric building blocks for the spending forecast pipeline.
//! Everything in here works on plain `f64` values; money handling and
//! rounding live in `spend_forecast`.

use thiserror::Error;

pub mod regression;

pub use regression::LinearRegression;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model is not fitted: {0}")]
    NotFitted(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;
