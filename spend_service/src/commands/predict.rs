//! Predict command - prints one user's forecasts as JSON.

use anyhow::{bail, Context, Result};
use spend_forecast::{Forecaster, ModelStore};
use tracing::info;

use super::HistorySource;
use crate::api::{NOT_ENOUGH_DATA_INSIGHTS, NOT_ENOUGH_DATA_PREDICTION};
use crate::config::SuggestionSettings;
use crate::suggestions::with_suggestions;

/// Runs the predict command and returns the JSON document it prints.
///
/// # Errors
///
/// Returns an error if the model is missing, the history cannot be read, or
/// the user has no category with enough history.
pub async fn run(
    source: &HistorySource,
    store: &ModelStore,
    user_id: i64,
    insights: bool,
    suggestions: Option<SuggestionSettings>,
) -> Result<String> {
    let forecaster = Forecaster::load(store).context("Cannot predict without a trained model")?;
    let transactions = source
        .debits(user_id)
        .await
        .with_context(|| format!("Failed to load transactions for user {user_id}"))?;

    info!(user_id, transactions = transactions.len(), insights, "Predicting");

    let output = tokio::task::spawn_blocking(move || -> Result<String> {
        if insights {
            let result = with_suggestions(suggestions.as_ref(), |source| {
                forecaster.forecast_with_insights(&transactions, source)
            });
            match result {
                Ok(results) => Ok(serde_json::to_string_pretty(&results)?),
                Err(err) if err.is_insufficient_data() => bail!(NOT_ENOUGH_DATA_INSIGHTS),
                Err(err) => Err(err.into()),
            }
        } else {
            match forecaster.forecast(&transactions) {
                Ok(predictions) => Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "user_id": user_id,
                    "predictions": predictions,
                }))?),
                Err(err) if err.is_insufficient_data() => bail!(NOT_ENOUGH_DATA_PREDICTION),
                Err(err) => Err(err.into()),
            }
        }
    })
    .await??;

    println!("{output}");
    Ok(output)
}
