//! Trend classification and suggestion text for forecasts

use crate::aggregate::CategorySeries;
use crate::error::{ForecastError, Result, SuggestionError};
use crate::money::round_amount;
use crate::pipeline::ForecastResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Absolute difference from the monthly average that counts as a trend
pub const TREND_THRESHOLD: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Prefix of the suggestion text used when the generator fails
pub const SUGGESTION_FAILURE_MARKER: &str = "[suggestion unavailable";

/// Direction of a forecast relative to the historical average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Steady,
}

impl Trend {
    /// Up above +50, down below -50, steady inside the inclusive band
    pub fn classify(difference: Decimal) -> Self {
        if difference > TREND_THRESHOLD {
            Trend::Up
        } else if difference < -TREND_THRESHOLD {
            Trend::Down
        } else {
            Trend::Steady
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Steady => "steady",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A forecast with its comparison to the category's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightResult {
    pub category: String,
    #[serde(rename = "predicted", with = "rust_decimal::serde::float")]
    pub predicted_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_avg: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub difference: Decimal,
    pub trend: Trend,
    pub suggestion: String,
}

/// Structured input handed to a suggestion generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionPrompt {
    pub category: String,
    pub predicted: Decimal,
    pub monthly_avg: Decimal,
    pub difference: Decimal,
    pub trend: Trend,
}

impl SuggestionPrompt {
    /// Prompt text for a language model
    pub fn render(&self) -> String {
        format!(
            "Category: {}\n\
             Predicted spending next month: {}\n\
             Historical monthly average: {}\n\
             Difference from average: {}\n\
             Trend: {}\n\
             Write one short, practical budgeting suggestion for this category. Plain text only.",
            self.category, self.predicted, self.monthly_avg, self.difference, self.trend
        )
    }
}

/// Source of suggestion text for one category
pub trait SuggestionSource {
    fn suggest(&self, prompt: &SuggestionPrompt) -> std::result::Result<String, SuggestionError>;
}

/// Deterministic suggestions keyed on the trend
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSuggestions;

impl SuggestionSource for TemplateSuggestions {
    fn suggest(&self, prompt: &SuggestionPrompt) -> std::result::Result<String, SuggestionError> {
        let category = &prompt.category;
        Ok(match prompt.trend {
            Trend::Up => format!(
                "Your spending on {category} is projected to increase. Consider reducing unnecessary expenses."
            ),
            Trend::Down => format!(
                "Your spending on {category} is expected to decrease. Keep up the good work!"
            ),
            Trend::Steady => {
                format!("Your {category} expenses are stable. Keep budgeting wisely.")
            }
        })
    }
}

/// Turns forecasts into insights using a suggestion source
pub struct InsightGenerator<'a> {
    suggestions: &'a dyn SuggestionSource,
}

impl<'a> InsightGenerator<'a> {
    pub fn new(suggestions: &'a dyn SuggestionSource) -> Self {
        Self { suggestions }
    }

    /// Build the insight for one forecast. Suggestion failures never fail the call.
    pub fn generate(
        &self,
        forecast: ForecastResult,
        series: &CategorySeries,
    ) -> Result<InsightResult> {
        let average = series.monthly_average(&forecast.category).ok_or_else(|| {
            ForecastError::Data(format!("No history for category {}", forecast.category))
        })?;

        let difference = round_amount(forecast.predicted_amount - average);
        let trend = Trend::classify(difference);
        let monthly_avg = round_amount(average);

        let prompt = SuggestionPrompt {
            category: forecast.category.clone(),
            predicted: forecast.predicted_amount,
            monthly_avg,
            difference,
            trend,
        };

        let suggestion = match self.suggestions.suggest(&prompt) {
            Ok(text) => text,
            Err(err) => {
                warn!(category = %forecast.category, error = %err, "Suggestion generation failed");
                format!("{SUGGESTION_FAILURE_MARKER}: {err}]")
            }
        };

        Ok(InsightResult {
            category: forecast.category,
            predicted_amount: forecast.predicted_amount,
            monthly_avg,
            difference,
            trend,
            suggestion,
        })
    }
}
