//! Train command - fits the shared forecast model and writes the artifact.

use anyhow::{Context, Result};
use spend_forecast::{train_model, ForecastError, ModelStore};
use tracing::{error, info};

use super::HistorySource;

/// Runs the train command.
///
/// Trains on `user_ids`, or on every user in the source when empty. The
/// previous artifact is left untouched when no training row can be built.
///
/// # Errors
///
/// Returns an error if histories cannot be read, training data is empty, or
/// the artifact cannot be written.
pub async fn run(source: &HistorySource, store: &ModelStore, user_ids: &[i64]) -> Result<()> {
    let users = if user_ids.is_empty() {
        source.user_ids().await?
    } else {
        user_ids.to_vec()
    };
    info!(users = users.len(), "Loading debit histories");

    let mut histories = Vec::with_capacity(users.len());
    for user_id in users {
        histories.push(
            source
                .debits(user_id)
                .await
                .with_context(|| format!("Failed to load transactions for user {user_id}"))?,
        );
    }

    match train_model(&histories, store) {
        Ok(model) => {
            info!(
                samples = model.sample_count(),
                path = %store.path().display(),
                "Training complete"
            );
            Ok(())
        }
        Err(err @ ForecastError::TrainingDataEmpty) => {
            error!("No category has enough monthly history to train on");
            Err(err.into())
        }
        Err(err) => Err(err).context("Training failed"),
    }
}
