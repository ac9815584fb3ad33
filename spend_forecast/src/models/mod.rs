//! Forecasting models over lag-window samples

use crate::error::Result;
use crate::features::FeatureSample;
use std::fmt::Debug;

/// Trained forecast model, read-only once built
pub trait TrainedForecastModel: Debug + Send + Sync {
    /// Predict the next-month amount for each sample, in input order
    fn predict(&self, samples: &[FeatureSample]) -> Result<Vec<f64>>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on lag-window samples
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on samples carrying a target
    fn train(&self, samples: &[FeatureSample]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod lag_regression;
pub mod store;

pub use lag_regression::{LagRegression, TrainedLagRegression};
pub use store::ModelStore;
