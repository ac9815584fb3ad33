//! Monthly aggregation of transactions per category

use crate::transaction::Transaction;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Total spent in one category during one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub category: String,
    /// First day of the month
    pub month: NaiveDate,
    pub total_amount: Decimal,
}

/// Chronological monthly buckets for every category with spending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySeries {
    series: BTreeMap<String, Vec<MonthlyBucket>>,
}

impl CategorySeries {
    /// Number of categories
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Categories in lexical order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Buckets of one category, oldest month first
    pub fn buckets(&self, category: &str) -> Option<&[MonthlyBucket]> {
        self.series.get(category).map(Vec::as_slice)
    }

    /// `(category, buckets)` pairs, buckets oldest month first
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MonthlyBucket])> {
        self.series
            .iter()
            .map(|(category, buckets)| (category.as_str(), buckets.as_slice()))
    }

    /// Mean monthly total over the whole history of a category
    pub fn monthly_average(&self, category: &str) -> Option<Decimal> {
        let buckets = self.buckets(category)?;
        if buckets.is_empty() {
            return None;
        }
        let total: Decimal = buckets.iter().map(|b| b.total_amount).sum();
        Some(total / Decimal::from(buckets.len()))
    }
}

/// Truncate a timestamp to the first day of its calendar month
pub fn month_start(timestamp: NaiveDateTime) -> NaiveDate {
    let date = timestamp.date();
    date - Days::new(u64::from(date.day0()))
}

/// Group transactions by (category, month) and sum their amounts
pub fn aggregate_monthly(transactions: &[Transaction]) -> CategorySeries {
    let mut totals: BTreeMap<&str, BTreeMap<NaiveDate, Decimal>> = BTreeMap::new();

    for transaction in transactions {
        *totals
            .entry(transaction.category.as_str())
            .or_default()
            .entry(month_start(transaction.timestamp))
            .or_default() += transaction.amount;
    }

    let series = totals
        .into_iter()
        .map(|(category, months)| {
            let buckets = months
                .into_iter()
                .map(|(month, total_amount)| MonthlyBucket {
                    category: category.to_string(),
                    month,
                    total_amount,
                })
                .collect();
            (category.to_string(), buckets)
        })
        .collect();

    CategorySeries { series }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 15, 0)
            .unwrap()
    }

    #[test]
    fn test_month_start() {
        assert_eq!(
            month_start(at(2024, 2, 29, 23)),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
        assert_eq!(
            month_start(at(2024, 12, 1, 0)),
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
        );
    }

    #[test]
    fn test_groups_by_category_and_month() {
        let transactions = vec![
            Transaction::new(dec!(20.10), "Food", at(2024, 3, 31, 23)),
            Transaction::new(dec!(5.05), "Transport", at(2024, 1, 2, 8)),
            Transaction::new(dec!(10.00), "Food", at(2024, 1, 15, 12)),
            Transaction::new(dec!(0.20), "Food", at(2024, 3, 1, 0)),
            Transaction::new(dec!(30.00), "Food", at(2024, 1, 31, 20)),
        ];

        let series = aggregate_monthly(&transactions);

        assert_eq!(series.len(), 2);
        assert_eq!(series.categories().collect::<Vec<_>>(), vec!["Food", "Transport"]);

        let food = series.buckets("Food").unwrap();
        assert_eq!(
            food.iter()
                .map(|b| (b.month, b.total_amount))
                .collect::<Vec<_>>(),
            vec![
                (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), dec!(40.00)),
                (NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), dec!(20.30)),
            ]
        );
        assert!(food.iter().all(|b| b.category == "Food"));
        assert!(series.buckets("Rent").is_none());
    }

    #[test]
    fn test_empty_input_yields_empty_series() {
        let series = aggregate_monthly(&[]);
        assert!(series.is_empty());
        assert_eq!(series.monthly_average("Food"), None);
    }

    #[test]
    fn test_monthly_average_uses_every_bucket() {
        let transactions: Vec<Transaction> = [100, 120, 110, 130]
            .into_iter()
            .enumerate()
            .map(|(i, amount)| {
                Transaction::new(Decimal::from(amount), "Food", at(2024, i as u32 + 1, 10, 9))
            })
            .collect();

        let series = aggregate_monthly(&transactions);
        assert_eq!(series.monthly_average("Food"), Some(dec!(115)));
    }
}
