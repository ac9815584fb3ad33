//! Global linear regression over the three monthly lags
//!
//! One coefficient set is shared by every category; the category label is
//! not a feature.

use crate::error::{ForecastError, Result};
use crate::features::{FeatureSample, LAG_COUNT};
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::money::to_f64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spend_math::LinearRegression;
use tracing::info;

const MODEL_NAME: &str = "Lag Regression (3 months)";

/// Untrained lag regression
#[derive(Debug, Clone, Default)]
pub struct LagRegression;

/// Fitted lag regression, the persisted model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedLagRegression {
    /// Name of the model
    name: String,
    /// Fitted parameters over `[prev_1, prev_2, prev_3]`
    regression: LinearRegression,
    /// Number of training rows
    sample_count: usize,
    /// When the fit happened
    trained_at: DateTime<Utc>,
}

impl LagRegression {
    pub fn new() -> Self {
        Self
    }
}

impl ForecastModel for LagRegression {
    type Trained = TrainedLagRegression;

    fn train(&self, samples: &[FeatureSample]) -> Result<Self::Trained> {
        if samples.is_empty() {
            return Err(ForecastError::TrainingDataEmpty);
        }

        let mut rows = Vec::with_capacity(samples.len());
        let mut targets = Vec::with_capacity(samples.len());
        for sample in samples {
            let target = sample.target.ok_or_else(|| {
                ForecastError::Data(format!(
                    "Training sample for {} has no target",
                    sample.category
                ))
            })?;
            rows.push(sample.features().to_vec());
            targets.push(to_f64(target));
        }

        let mut regression = LinearRegression::new(LAG_COUNT)?;
        regression.fit(&rows, &targets)?;

        info!(
            samples = samples.len(),
            coefficients = ?regression.coefficients(),
            intercept = ?regression.intercept(),
            "Fitted lag regression"
        );

        TrainedLagRegression::new(regression, samples.len())
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }
}

impl TrainedLagRegression {
    /// Wrap an already fitted regression over three lags
    pub fn new(regression: LinearRegression, sample_count: usize) -> Result<Self> {
        let model = Self {
            name: MODEL_NAME.to_string(),
            regression,
            sample_count,
            trained_at: Utc::now(),
        };
        model.validate()?;
        Ok(model)
    }

    /// Check that the parameters fit the three-lag feature layout
    pub fn validate(&self) -> Result<()> {
        if !self.regression.is_fitted() {
            return Err(ForecastError::Forecasting(
                "Regression parameters are missing".to_string(),
            ));
        }
        if self.regression.n_features() != LAG_COUNT {
            return Err(ForecastError::Forecasting(format!(
                "Expected {} lag coefficients, found {}",
                LAG_COUNT,
                self.regression.n_features()
            )));
        }
        Ok(())
    }

    pub fn regression(&self) -> &LinearRegression {
        &self.regression
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }
}

impl TrainedForecastModel for TrainedLagRegression {
    fn predict(&self, samples: &[FeatureSample]) -> Result<Vec<f64>> {
        samples
            .iter()
            .map(|sample| Ok(self.regression.predict(&sample.features())?))
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
