//! HTTP error responses for the forecast API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use spend_forecast::ForecastError;
use tracing::{error, warn};

use crate::db::StoreError;

/// Body of a 400 from the prediction endpoint
pub const NOT_ENOUGH_DATA_PREDICTION: &str = "Not enough data to make prediction";

/// Body of a 400 from the insights endpoint
pub const NOT_ENOUGH_DATA_INSIGHTS: &str = "Not enough data to generate insights";

/// Failure of a single API request.
#[derive(Debug)]
pub enum ApiError {
    /// The user has no category with enough monthly history.
    NotEnoughData(&'static str),
    /// The transaction store failed.
    Store(StoreError),
    /// The forecasting pipeline failed.
    Forecast(ForecastError),
    /// The blocking pipeline task did not complete.
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// Maps a pipeline error, turning the empty-data outcome into `message`.
    pub fn from_forecast(err: ForecastError, message: &'static str) -> Self {
        if err.is_insufficient_data() {
            ApiError::NotEnoughData(message)
        } else {
            ApiError::Forecast(err)
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("forecast task failed: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotEnoughData(message) => {
                warn!(reason = message, "Rejected request");
                (StatusCode::BAD_REQUEST, message.to_string())
            }
            ApiError::Store(err) => {
                error!(error = %err, "Transaction store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("transaction store error: {}", err.kind()),
                )
            }
            ApiError::Forecast(err) => {
                error!(error = %err, "Forecast failure");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Internal(message) => {
                error!(reason = %message, "Internal failure");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
