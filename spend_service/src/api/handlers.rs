use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use spend_forecast::{ForecastResult, InsightResult};
use tracing::info;

use super::error::{ApiError, NOT_ENOUGH_DATA_INSIGHTS, NOT_ENOUGH_DATA_PREDICTION};
use super::AppState;
use crate::db;
use crate::suggestions::with_suggestions;

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub user_id: i64,
    pub predictions: Vec<ForecastResult>,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn predict(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let transactions = db::load_debit_transactions(&state.pool, user_id).await?;

    let forecaster = Arc::clone(&state.forecaster);
    let predictions = tokio::task::spawn_blocking(move || forecaster.forecast(&transactions))
        .await?
        .map_err(|e| ApiError::from_forecast(e, NOT_ENOUGH_DATA_PREDICTION))?;

    info!(user_id, categories = predictions.len(), "Served prediction");
    Ok(Json(PredictionResponse {
        user_id,
        predictions,
    }))
}

pub async fn insights(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<InsightResult>>, ApiError> {
    let transactions = db::load_debit_transactions(&state.pool, user_id).await?;

    let forecaster = Arc::clone(&state.forecaster);
    let settings = state.suggestions.clone();
    let insights = tokio::task::spawn_blocking(move || {
        with_suggestions(settings.as_ref(), |source| {
            forecaster.forecast_with_insights(&transactions, source)
        })
    })
    .await?
    .map_err(|e| ApiError::from_forecast(e, NOT_ENOUGH_DATA_INSIGHTS))?;

    info!(user_id, categories = insights.len(), "Served insights");
    Ok(Json(insights))
}
