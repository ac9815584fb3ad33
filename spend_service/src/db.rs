//! SQLite access to the wallet transaction table.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use spend_forecast::data::parse_timestamp;
use spend_forecast::{Transaction, TransactionKind};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use thiserror::Error;
use tracing::debug;

/// Failures of the transaction store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("amount {amount} for user {user_id} is not a finite number")]
    InvalidAmount { user_id: i64, amount: f64 },

    #[error("timestamp {value:?} for user {user_id} is not a date")]
    InvalidTimestamp { user_id: i64, value: String },
}

impl StoreError {
    /// Short description that never carries connection details
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Database(err) => match err {
                sqlx::Error::RowNotFound => "row not found",
                sqlx::Error::PoolTimedOut => "connection pool timed out",
                sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                    "connection failure"
                }
                sqlx::Error::Database(_) => "query rejected",
                sqlx::Error::ColumnDecode { .. }
                | sqlx::Error::ColumnNotFound(_)
                | sqlx::Error::Decode(_) => "invalid row data",
                _ => "unexpected failure",
            },
            StoreError::InvalidAmount { .. } | StoreError::InvalidTimestamp { .. } => {
                "invalid row data"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Connects to the SQLite database at `database_url`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn create_pool(database_url: &str) -> Result<Pool<Sqlite>> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Creates the `wallet_transactions` table when it does not exist yet.
///
/// # Errors
///
/// Returns an error if the statement fails.
pub async fn ensure_schema(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS wallet_transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            type TEXT NOT NULL,
            timestamp TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Loads every debit transaction of one user.
///
/// The type is matched case-insensitively and timestamps are parsed like the
/// CSV loader's, so a bare date means midnight. A single connection is held
/// for the query and returned to the pool when this function exits, on
/// success and on error.
///
/// # Errors
///
/// Returns an error if the query fails or a row holds a non-finite amount or
/// an unparseable timestamp.
pub async fn load_debit_transactions(
    pool: &Pool<Sqlite>,
    user_id: i64,
) -> Result<Vec<Transaction>> {
    let mut conn = pool.acquire().await?;

    let rows: Vec<(f64, String, String)> = sqlx::query_as(
        r"
        SELECT CAST(amount AS REAL), category, CAST(timestamp AS TEXT)
        FROM wallet_transactions
        WHERE user_id = ? AND LOWER(type) = ?
        ",
    )
    .bind(user_id)
    .bind(TransactionKind::Debit.as_str())
    .fetch_all(&mut *conn)
    .await?;

    debug!(user_id, rows = rows.len(), "Loaded debit transactions");

    rows.into_iter()
        .map(|(amount, category, timestamp)| {
            let amount = Decimal::from_f64(amount)
                .ok_or(StoreError::InvalidAmount { user_id, amount })?;
            let timestamp = parse_timestamp(&timestamp).ok_or(StoreError::InvalidTimestamp {
                user_id,
                value: timestamp,
            })?;
            Ok(Transaction::new(amount, category, timestamp))
        })
        .collect()
}

/// Distinct users that have at least one debit, in ascending order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_user_ids(pool: &Pool<Sqlite>) -> Result<Vec<i64>> {
    let ids: Vec<(i64,)> = sqlx::query_as(
        "SELECT DISTINCT user_id FROM wallet_transactions WHERE LOWER(type) = ? ORDER BY user_id",
    )
    .bind(TransactionKind::Debit.as_str())
    .fetch_all(pool)
    .await?;
    Ok(ids.into_iter().map(|(id,)| id).collect())
}

/// Inserts one transaction row.
///
/// # Errors
///
/// Returns an error if the amount cannot be stored or the insert fails.
pub async fn insert_transaction(
    pool: &Pool<Sqlite>,
    user_id: i64,
    kind: TransactionKind,
    transaction: &Transaction,
) -> Result<()> {
    let amount = transaction.amount.to_f64().ok_or(StoreError::InvalidAmount {
        user_id,
        amount: f64::NAN,
    })?;

    sqlx::query(
        r"
        INSERT INTO wallet_transactions (user_id, amount, category, type, timestamp)
        VALUES (?, ?, ?, ?, ?)
        ",
    )
    .bind(user_id)
    .bind(amount)
    .bind(&transaction.category)
    .bind(kind.as_str())
    .bind(transaction.timestamp)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    async fn memory_pool() -> Pool<Sqlite> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        ensure_schema(&pool).await.unwrap();
        pool
    }

    async fn insert_raw(pool: &Pool<Sqlite>, amount: f64, kind: &str, timestamp: &str) {
        sqlx::query(
            "INSERT INTO wallet_transactions (user_id, amount, category, type, timestamp) \
             VALUES (1, ?, 'Food', ?, ?)",
        )
        .bind(amount)
        .bind(kind)
        .bind(timestamp)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_bare_dates_and_mixed_case_types_load() {
        let pool = memory_pool().await;
        insert_raw(&pool, 19.99, "debit", "2024-01-05").await;
        insert_raw(&pool, 5.00, "DEBIT", "2024-02-07 08:00:00").await;
        insert_raw(&pool, 3000.0, "Credit", "2024-02-01").await;

        let loaded = load_debit_transactions(&pool, 1).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].amount, dec!(19.99));
        assert_eq!(
            loaded[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(loaded[1].amount, dec!(5));
        assert_eq!(list_user_ids(&pool).await.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_unparseable_timestamp_is_row_data_error() {
        let pool = memory_pool().await;
        insert_raw(&pool, 10.0, "debit", "05/01/2024").await;

        let err = load_debit_transactions(&pool, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidTimestamp { user_id: 1, .. }));
        assert_eq!(err.kind(), "invalid row data");
    }

    #[test]
    fn test_error_kinds_hide_details() {
        let err = StoreError::Database(sqlx::Error::Configuration(
            "sqlite:///secret/path.db is unreadable".into(),
        ));
        assert_eq!(err.kind(), "unexpected failure");

        assert_eq!(
            StoreError::Database(sqlx::Error::PoolTimedOut).kind(),
            "connection pool timed out"
        );
        assert_eq!(StoreError::Database(sqlx::Error::RowNotFound).kind(), "row not found");
        assert_eq!(
            StoreError::InvalidAmount {
                user_id: 1,
                amount: f64::INFINITY
            }
            .kind(),
            "invalid row data"
        );
    }
}
