//! HTTP API serving forecasts and insights per user.

mod error;
mod handlers;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use spend_forecast::Forecaster;
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::config::SuggestionSettings;

pub use error::{ApiError, NOT_ENOUGH_DATA_INSIGHTS, NOT_ENOUGH_DATA_PREDICTION};
pub use handlers::PredictionResponse;

/// State shared by every request. The model is loaded once and only read.
#[derive(Clone)]
pub struct AppState {
    pub pool: Pool<Sqlite>,
    pub forecaster: Arc<Forecaster>,
    pub suggestions: Option<SuggestionSettings>,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(routes::api_routes())
        .with_state(state)
}

/// Serves the API on `addr` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or serving fails.
pub async fn run_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    info!("Server stopped");
    Ok(())
}
