//! Lag-window features built from monthly category series
//!
//! Each category is windowed on its own, oldest month first. A sample holds
//! the three lag totals `prev_1` (latest) .. `prev_3`. In training mode it
//! also holds the target: the total of the month right after the current
//! one, where the current month sits immediately after `prev_1`.

use crate::aggregate::{CategorySeries, MonthlyBucket};
use crate::error::{ForecastError, Result};
use crate::money::to_f64;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of lag features per sample
pub const LAG_COUNT: usize = 3;

/// Whether windows are built for fitting or for forecasting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    Training,
    Inference,
}

impl WindowMode {
    /// Minimum monthly buckets a category needs to produce any sample
    pub fn min_buckets(self) -> usize {
        match self {
            // lags + current + next
            WindowMode::Training => LAG_COUNT + 2,
            WindowMode::Inference => LAG_COUNT + 1,
        }
    }

    pub fn includes_target(self) -> bool {
        matches!(self, WindowMode::Training)
    }
}

/// Lag features for one category, most recent first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSample {
    pub category: String,
    pub prev_1: Decimal,
    pub prev_2: Decimal,
    pub prev_3: Decimal,
    /// Present only on training samples
    pub target: Option<Decimal>,
}

impl FeatureSample {
    /// Build a sample from lags given oldest first
    fn from_lags(category: &str, lags: &[Decimal; LAG_COUNT], target: Option<Decimal>) -> Self {
        Self {
            category: category.to_string(),
            prev_1: lags[2],
            prev_2: lags[1],
            prev_3: lags[0],
            target,
        }
    }

    /// Regression input in `[prev_1, prev_2, prev_3]` order
    pub fn features(&self) -> [f64; LAG_COUNT] {
        [to_f64(self.prev_1), to_f64(self.prev_2), to_f64(self.prev_3)]
    }
}

/// Per-category outcome of windowing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryWindows {
    Included {
        category: String,
        samples: Vec<FeatureSample>,
    },
    SkippedInsufficientHistory {
        category: String,
        buckets: usize,
        required: usize,
    },
}

impl CategoryWindows {
    pub fn category(&self) -> &str {
        match self {
            CategoryWindows::Included { category, .. }
            | CategoryWindows::SkippedInsufficientHistory { category, .. } => category,
        }
    }

    /// Samples produced for this category; empty when skipped
    pub fn samples(&self) -> &[FeatureSample] {
        match self {
            CategoryWindows::Included { samples, .. } => samples,
            CategoryWindows::SkippedInsufficientHistory { .. } => &[],
        }
    }
}

/// Window every category of `series` for the given mode
pub fn build_windows(series: &CategorySeries, mode: WindowMode) -> Vec<CategoryWindows> {
    series
        .iter()
        .map(|(category, buckets)| category_windows(category, buckets, mode))
        .collect()
}

fn category_windows(
    category: &str,
    buckets: &[MonthlyBucket],
    mode: WindowMode,
) -> CategoryWindows {
    let required = mode.min_buckets();
    if buckets.len() < required {
        return CategoryWindows::SkippedInsufficientHistory {
            category: category.to_string(),
            buckets: buckets.len(),
            required,
        };
    }

    let totals: Vec<Decimal> = buckets.iter().map(|b| b.total_amount).collect();
    let samples = if mode.includes_target() {
        // [prev_3, prev_2, prev_1, current, next]
        totals
            .windows(LAG_COUNT + 2)
            .map(|w| {
                let lags = [w[0], w[1], w[2]];
                FeatureSample::from_lags(category, &lags, Some(w[LAG_COUNT + 1]))
            })
            .collect()
    } else {
        let latest = &totals[totals.len() - LAG_COUNT..];
        let lags = [latest[0], latest[1], latest[2]];
        vec![FeatureSample::from_lags(category, &lags, None)]
    };

    CategoryWindows::Included {
        category: category.to_string(),
        samples,
    }
}

fn log_skips(windows: &[CategoryWindows], mode: WindowMode) {
    for window in windows {
        if let CategoryWindows::SkippedInsufficientHistory {
            category,
            buckets,
            required,
        } = window
        {
            debug!(
                category = %category,
                buckets,
                required,
                ?mode,
                "Skipping category with short history"
            );
        }
    }
}

/// Training rows from every category with enough history, concatenated
pub fn training_samples(series: &CategorySeries) -> Vec<FeatureSample> {
    let windows = build_windows(series, WindowMode::Training);
    log_skips(&windows, WindowMode::Training);
    windows
        .iter()
        .flat_map(|w| w.samples().iter().cloned())
        .collect()
}

/// The most recent lag window of every qualifying category
pub fn latest_samples(series: &CategorySeries) -> Result<Vec<FeatureSample>> {
    let windows = build_windows(series, WindowMode::Inference);
    log_skips(&windows, WindowMode::Inference);

    let samples: Vec<FeatureSample> = windows
        .iter()
        .flat_map(|w| w.samples().iter().cloned())
        .collect();

    if samples.is_empty() {
        return Err(ForecastError::InsufficientData(format!(
            "no category has at least {} months of spending",
            WindowMode::Inference.min_buckets()
        )));
    }
    Ok(samples)
}
