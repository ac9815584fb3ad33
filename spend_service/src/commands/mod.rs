//! CLI command implementations.

pub mod predict;
pub mod serve;
pub mod train;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use spend_forecast::{DataLoader, Transaction};
use sqlx::{Pool, Sqlite};

use crate::config::Config;
use crate::db;

/// Where a command reads debit histories from.
pub enum HistorySource {
    /// Debits of a CSV export, grouped per user
    Csv(BTreeMap<i64, Vec<Transaction>>),
    /// The `wallet_transactions` table
    Database(Pool<Sqlite>),
}

impl HistorySource {
    /// Uses the CSV file when given, the configured database otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV cannot be read or the database is unreachable.
    pub async fn open(config: &Config, csv: Option<&Path>) -> Result<Self> {
        match csv {
            Some(path) => Self::from_csv(path).await,
            None => {
                let pool = db::create_pool(config.database_url()?)
                    .await
                    .context("Failed to connect to the transaction database")?;
                Ok(HistorySource::Database(pool))
            }
        }
    }

    /// Reads a CSV export once, off the async runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds a malformed row.
    pub async fn from_csv(path: &Path) -> Result<Self> {
        let owned = path.to_path_buf();
        let users = tokio::task::spawn_blocking(move || DataLoader::debits_by_user(owned))
            .await?
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(HistorySource::Csv(users))
    }

    /// Every user with at least one debit, ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    pub async fn user_ids(&self) -> Result<Vec<i64>> {
        match self {
            HistorySource::Csv(users) => Ok(users.keys().copied().collect()),
            HistorySource::Database(pool) => Ok(db::list_user_ids(pool).await?),
        }
    }

    /// Debit history of one user.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    pub async fn debits(&self, user_id: i64) -> Result<Vec<Transaction>> {
        match self {
            HistorySource::Csv(users) => Ok(users.get(&user_id).cloned().unwrap_or_default()),
            HistorySource::Database(pool) => Ok(db::load_debit_transactions(pool, user_id).await?),
        }
    }
}
