//! Loading wallet exports from CSV

use crate::error::{ForecastError, Result};
use crate::transaction::{Transaction, TransactionKind};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// One line of a wallet export: `user_id,amount,category,type,timestamp`
#[derive(Debug, Deserialize)]
struct WalletRecord {
    user_id: i64,
    amount: String,
    category: String,
    #[serde(rename = "type")]
    kind: String,
    timestamp: String,
}

/// Data loader for wallet transaction exports
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load the debit transactions of `user_id` from a CSV export
    pub fn from_csv<P: AsRef<Path>>(path: P, user_id: i64) -> Result<Vec<Transaction>> {
        let mut transactions = Vec::new();

        for (line, record) in Self::records(path.as_ref())? {
            if record.user_id != user_id {
                continue;
            }
            if let Some(transaction) = Self::debit(line, record)? {
                transactions.push(transaction);
            }
        }

        debug!(
            user_id,
            count = transactions.len(),
            "Loaded debit transactions from CSV"
        );
        Ok(transactions)
    }

    /// Debit transactions of every user in a CSV export, read in one pass.
    ///
    /// Users with no debits are absent from the map.
    pub fn debits_by_user<P: AsRef<Path>>(path: P) -> Result<BTreeMap<i64, Vec<Transaction>>> {
        let mut users: BTreeMap<i64, Vec<Transaction>> = BTreeMap::new();

        for (line, record) in Self::records(path.as_ref())? {
            let user_id = record.user_id;
            if let Some(transaction) = Self::debit(line, record)? {
                users.entry(user_id).or_default().push(transaction);
            }
        }

        debug!(users = users.len(), "Loaded debit transactions from CSV");
        Ok(users)
    }

    /// Distinct user ids present in a CSV export, sorted ascending
    pub fn users_in_csv<P: AsRef<Path>>(path: P) -> Result<Vec<i64>> {
        let users: BTreeSet<i64> = Self::records(path.as_ref())?
            .into_iter()
            .map(|(_, record)| record.user_id)
            .collect();
        Ok(users.into_iter().collect())
    }

    /// Parse one record; credits yield `None`
    fn debit(line: u64, record: WalletRecord) -> Result<Option<Transaction>> {
        let kind = TransactionKind::from_str(&record.kind)
            .map_err(|e| ForecastError::Data(format!("line {line}: {e}")))?;
        if kind != TransactionKind::Debit {
            return Ok(None);
        }

        let amount = Decimal::from_str(record.amount.trim()).map_err(|e| {
            ForecastError::Data(format!("line {line}: invalid amount {:?}: {e}", record.amount))
        })?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| {
            ForecastError::Data(format!(
                "line {line}: invalid timestamp {:?}",
                record.timestamp
            ))
        })?;

        Ok(Some(Transaction::new(amount, record.category, timestamp)))
    }

    fn records(path: &Path) -> Result<Vec<(u64, WalletRecord)>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut records = Vec::new();
        for result in reader.deserialize::<WalletRecord>() {
            let record = result?;
            // Header is line 1
            let line = records.len() as u64 + 2;
            records.push((line, record));
        }
        Ok(records)
    }
}

/// Parse a stored timestamp; a bare date means midnight
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-15 14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-15T14:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-15"),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("15/03/2024"), None);
    }
}
