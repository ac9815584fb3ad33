//! End-to-end training and forecasting over transaction histories

use crate::aggregate::{aggregate_monthly, CategorySeries};
use crate::error::{ForecastError, Result};
use crate::features::{latest_samples, training_samples};
use crate::insights::{InsightGenerator, InsightResult, SuggestionSource};
use crate::models::{
    ForecastModel, LagRegression, ModelStore, TrainedForecastModel, TrainedLagRegression,
};
use crate::money::round_currency;
use crate::transaction::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Next-month forecast for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub category: String,
    /// Rounded to cents
    #[serde(with = "rust_decimal::serde::float")]
    pub predicted_amount: Decimal,
}

/// Serves forecasts from a trained model that is never mutated
#[derive(Debug)]
pub struct Forecaster<M = TrainedLagRegression> {
    model: M,
}

impl Forecaster<TrainedLagRegression> {
    /// Load the persisted artifact
    pub fn load(store: &ModelStore) -> Result<Self> {
        Ok(Self::new(store.load()?))
    }
}

impl<M: TrainedForecastModel> Forecaster<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Forecast next month for every category with enough history
    pub fn forecast(&self, transactions: &[Transaction]) -> Result<Vec<ForecastResult>> {
        let series = aggregate_monthly(transactions);
        self.forecast_series(&series)
    }

    /// Forecasts plus trend and suggestion for every category with enough history
    pub fn forecast_with_insights(
        &self,
        transactions: &[Transaction],
        suggestions: &dyn SuggestionSource,
    ) -> Result<Vec<InsightResult>> {
        let series = aggregate_monthly(transactions);
        let forecasts = self.forecast_series(&series)?;

        let generator = InsightGenerator::new(suggestions);
        forecasts
            .into_iter()
            .map(|forecast| generator.generate(forecast, &series))
            .collect()
    }

    fn forecast_series(&self, series: &CategorySeries) -> Result<Vec<ForecastResult>> {
        let samples = latest_samples(series)?;
        let predictions = self.model.predict(&samples)?;
        if predictions.len() != samples.len() {
            return Err(ForecastError::Forecasting(format!(
                "{} returned {} predictions for {} samples",
                self.model.name(),
                predictions.len(),
                samples.len()
            )));
        }

        debug!(categories = samples.len(), model = self.model.name(), "Forecast categories");

        samples
            .into_iter()
            .zip(predictions)
            .map(|(sample, predicted)| {
                Ok(ForecastResult {
                    category: sample.category,
                    predicted_amount: round_currency(predicted)?,
                })
            })
            .collect()
    }
}

/// Train on every history and persist the artifact.
///
/// Each history is one user's debits and is aggregated on its own. When no
/// training row can be built, nothing is written.
pub fn train_model(
    histories: &[Vec<Transaction>],
    store: &ModelStore,
) -> Result<TrainedLagRegression> {
    let samples: Vec<_> = histories
        .iter()
        .flat_map(|history| training_samples(&aggregate_monthly(history)))
        .collect();

    info!(histories = histories.len(), samples = samples.len(), "Built training set");

    let model = LagRegression::new().train(&samples)?;
    store.save(&model)?;
    Ok(model)
}
