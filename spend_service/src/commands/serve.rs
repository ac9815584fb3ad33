//! Serve command - runs the HTTP API.

use std::sync::Arc;

use anyhow::{Context, Result};
use spend_forecast::Forecaster;
use tracing::info;

use crate::api::{run_server, AppState};
use crate::config::Config;
use crate::db;

/// Runs the serve command.
///
/// # Errors
///
/// Returns an error if the model artifact is missing, the database is
/// unreachable, or the server fails.
pub async fn run(config: &Config) -> Result<()> {
    let store = config.model_store();
    let forecaster = Forecaster::load(&store).context("Refusing to serve without a trained model")?;
    info!(
        path = %store.path().display(),
        samples = forecaster.model().sample_count(),
        "Loaded model"
    );

    let pool = db::create_pool(config.database_url()?)
        .await
        .context("Failed to connect to the transaction database")?;

    let state = AppState {
        pool,
        forecaster: Arc::new(forecaster),
        suggestions: config.suggestions.clone(),
    };

    if state.suggestions.is_none() {
        info!("OPENAI_API_KEY not set, using template suggestions");
    }

    run_server(state, config.bind_addr).await
}
