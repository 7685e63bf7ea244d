//! # Trade Math
//!
//! Technical indicators for the forecast engine.
//!
//! Every indicator is available in two forms: a streaming struct fed one
//! price at a time through `update`, and a whole-series helper returning one
//! `Option<f64>` per input observation, `None` while the indicator is still
//! warming up.

use thiserror::Error;

// Indicator modules
pub mod moving_averages;
pub mod oscillators;
pub mod volatility;

pub use moving_averages::{sma_series, SimpleMovingAverage};
pub use oscillators::{rsi_series, RelativeStrengthIndex};
pub use volatility::{annualize, rolling_volatility_series, RollingVolatility};

/// Errors that can occur in indicator calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;

pub(crate) fn ensure_finite(value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MathError::InvalidInput(format!(
            "Expected a finite value, got {}",
            value
        )))
    }
}

/// Number of leading `None` values in an indicator series
pub fn warm_up_len(series: &[Option<f64>]) -> usize {
    series.iter().take_while(|v| v.is_none()).count()
}
