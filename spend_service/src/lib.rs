//! Spending forecast service
//!
//! Serves per-category forecasts over HTTP from the `wallet_transactions`
//! table and provides the `spend-ai` command-line tools.

pub mod api;
pub mod commands;
pub mod config;
pub mod db;
pub mod suggestions;

pub use config::{Config, SuggestionSettings};
