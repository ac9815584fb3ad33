//! # Spend Forecast
//!
//! Next-month spending forecasts per category, computed from a user's
//! debit history.
//!
//! ## Pipeline
//!
//! - Debits are summed per category and calendar month
//! - Each category's monthly totals are windowed into three-month lag samples
//! - A single linear regression, shared by all categories, predicts the next month
//! - Forecasts are compared to the category's average month to derive a trend
//!   and a suggestion
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spend_forecast::{DataLoader, Forecaster, ModelStore, TemplateSuggestions};
//!
//! # fn main() -> spend_forecast::Result<()> {
//! // Train once from an export and persist the artifact
//! let store = ModelStore::new("spending_model.json");
//! let history = DataLoader::from_csv("wallet.csv", 101)?;
//! spend_forecast::train_model(&[history.clone()], &store)?;
//!
//! // Serve forecasts from the stored model
//! let forecaster = Forecaster::load(&store)?;
//! for insight in forecaster.forecast_with_insights(&history, &TemplateSuggestions)? {
//!     println!("{}: {} ({})", insight.category, insight.predicted_amount, insight.trend);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod data;
pub mod error;
pub mod features;
pub mod insights;
pub mod models;
pub mod money;
pub mod pipeline;
pub mod transaction;

// Re-export commonly used types
pub use crate::aggregate::{aggregate_monthly, CategorySeries, MonthlyBucket};
pub use crate::data::DataLoader;
pub use crate::error::{ForecastError, Result, SuggestionError};
pub use crate::features::{CategoryWindows, FeatureSample, WindowMode};
pub use crate::insights::{
    InsightGenerator, InsightResult, SuggestionPrompt, SuggestionSource, TemplateSuggestions, Trend,
};
pub use crate::models::{
    ForecastModel, LagRegression, ModelStore, TrainedForecastModel, TrainedLagRegression,
};
pub use crate::pipeline::{train_model, ForecastResult, Forecaster};
pub use crate::transaction::{Transaction, TransactionKind};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
