//! Conversions between money amounts and regression inputs

use crate::error::{ForecastError, Result};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits kept in every reported amount
pub const CURRENCY_DP: u32 = 2;

/// Round an amount to cents, halves away from zero
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a raw model output to cents
pub fn round_currency(value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(ForecastError::Forecasting(format!(
            "Model produced a non-finite prediction: {value}"
        )));
    }
    let amount = Decimal::from_f64(value).ok_or_else(|| {
        ForecastError::Forecasting(format!("Prediction {value} is out of range"))
    })?;
    Ok(round_amount(amount))
}

/// Amount as a regression input
pub fn to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}
