//! Wallet transactions as seen by the forecasting pipeline

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ForecastError;

/// A single debit pulled from the wallet history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub amount: Decimal,
    pub category: String,
    pub timestamp: NaiveDateTime,
}

impl Transaction {
    pub fn new(amount: Decimal, category: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            amount,
            category: category.into(),
            timestamp,
        }
    }
}

/// Direction of a wallet movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Debit,
    Credit,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Debit => "debit",
            TransactionKind::Credit => "credit",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debit" => Ok(TransactionKind::Debit),
            "credit" => Ok(TransactionKind::Credit),
            other => Err(ForecastError::Data(format!(
                "Unknown transaction type: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("debit".parse::<TransactionKind>().unwrap(), TransactionKind::Debit);
        assert_eq!(" Credit ".parse::<TransactionKind>().unwrap(), TransactionKind::Credit);
        assert!("refund".parse::<TransactionKind>().is_err());
        assert_eq!(TransactionKind::Debit.to_string(), "debit");
    }
}
