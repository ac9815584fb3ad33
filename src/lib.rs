//! # Spend AI
//!
//! Per-category spending forecasts for wallet users.
//!
//! This package re-exports the forecasting core ([`spend_forecast`]) and its
//! numeric primitives ([`spend_math`]). The HTTP service and the `spend-ai`
//! command-line tool live in the `spend_service` crate.
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use spend_ai_workspace::{aggregate_monthly, Transaction};
//!
//! let at = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let series = aggregate_monthly(&[
//!     Transaction::new(dec!(12.50), "Food", at),
//!     Transaction::new(dec!(7.50), "Food", at),
//! ]);
//! assert_eq!(series.monthly_average("Food"), Some(dec!(20.00)));
//! ```

pub use spend_forecast::*;
pub use spend_math;
