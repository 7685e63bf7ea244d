//! Volatility indicator implementations
//!
//! Contains a rolling standard deviation of percentage price changes,
//! optionally annualized.

use crate::{ensure_finite, MathError, Result};
use statrs::statistics::Statistics;
use std::collections::VecDeque;

/// Trading days in a year, used to annualize daily volatility
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Scale a per-period standard deviation to a yearly one
pub fn annualize(std_dev: f64, periods_per_year: f64) -> f64 {
    std_dev * periods_per_year.sqrt()
}

/// Rolling volatility over a window of prices
///
/// The window spans `window` prices, i.e. `window - 1` percentage changes,
/// and reports their sample standard deviation multiplied by
/// `sqrt(periods_per_year)`.
#[derive(Debug, Clone)]
pub struct RollingVolatility {
    window: usize,
    periods_per_year: f64,
    previous_price: Option<f64>,
    changes: VecDeque<f64>,
}

impl RollingVolatility {
    /// Create a rolling volatility annualized over trading days
    pub fn new(window: usize) -> Result<Self> {
        Self::with_annualization(window, TRADING_DAYS_PER_YEAR)
    }

    /// Create a rolling volatility with a custom annualization factor
    pub fn with_annualization(window: usize, periods_per_year: f64) -> Result<Self> {
        if window < 3 {
            return Err(MathError::InvalidInput(
                "Window must span at least 3 prices".to_string(),
            ));
        }
        if !(periods_per_year > 0.0 && periods_per_year.is_finite()) {
            return Err(MathError::InvalidInput(
                "Periods per year must be positive".to_string(),
            ));
        }

        Ok(Self {
            window,
            periods_per_year,
            previous_price: None,
            changes: VecDeque::with_capacity(window),
        })
    }

    /// Update with a new price
    pub fn update(&mut self, price: f64) -> Result<()> {
        ensure_finite(price)?;

        if let Some(prev) = self.previous_price {
            if prev == 0.0 {
                return Err(MathError::CalculationError(
                    "Cannot compute a percentage change from a zero price".to_string(),
                ));
            }
            self.changes.push_back(price / prev - 1.0);
            if self.changes.len() > self.window - 1 {
                self.changes.pop_front();
            }
        }
        self.previous_price = Some(price);

        Ok(())
    }

    /// Whether a full window has been observed
    pub fn is_ready(&self) -> bool {
        self.changes.len() == self.window - 1
    }

    /// Get the current annualized volatility
    pub fn value(&self) -> Result<f64> {
        if !self.is_ready() {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for volatility calculation. Need {} prices.",
                self.window
            )));
        }

        let std_dev = Statistics::std_dev(self.changes.iter());
        Ok(annualize(std_dev, self.periods_per_year))
    }

    /// Get the window length in prices
    pub fn window(&self) -> usize {
        self.window
    }

    /// Reset, clearing all values
    pub fn reset(&mut self) {
        self.previous_price = None;
        self.changes.clear();
    }
}

/// Annualized rolling volatility for every observation of `prices`.
///
/// The first `window - 1` entries are `None`.
pub fn rolling_volatility_series(prices: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    let mut volatility = RollingVolatility::new(window)?;
    let mut series = Vec::with_capacity(prices.len());

    for &price in prices {
        volatility.update(price)?;
        series.push(if volatility.is_ready() {
            Some(volatility.value()?)
        } else {
            None
        });
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warm_up_len;
    use approx::assert_relative_eq;

    #[test]
    fn test_volatility_value() {
        let mut vol = RollingVolatility::new(3).unwrap();
        vol.update(100.0).unwrap();
        vol.update(110.0).unwrap();
        assert!(vol.value().is_err());

        // changes +10% and -10%, sample std = sqrt(0.02)
        vol.update(99.0).unwrap();
        let expected = 0.02_f64.sqrt() * 252.0_f64.sqrt();
        assert_relative_eq!(vol.value().unwrap(), expected, max_relative = 1e-9);
    }

    #[test]
    fn test_constant_growth_has_zero_volatility() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let series = rolling_volatility_series(&prices, 20).unwrap();
        assert_relative_eq!(series[29].unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_volatility_series_warm_up() {
        let prices: Vec<f64> = (0..80).map(|i| 20.0 + (i as f64 * 0.3).cos()).collect();
        let series = rolling_volatility_series(&prices, 20).unwrap();

        assert_eq!(series.len(), prices.len());
        assert_eq!(warm_up_len(&series), 19);
        assert!(series[19..].iter().all(|v| v.map_or(false, |v| v > 0.0)));
    }

    #[test]
    fn test_annualize() {
        assert_relative_eq!(annualize(0.01, 252.0), 0.01 * 252.0_f64.sqrt());
        assert_relative_eq!(annualize(0.5, 1.0), 0.5);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(RollingVolatility::new(2).is_err());
        assert!(RollingVolatility::with_annualization(20, 0.0).is_err());

        let mut vol = RollingVolatility::new(5).unwrap();
        vol.update(0.0).unwrap();
        assert!(matches!(
            vol.update(1.0),
            Err(MathError::CalculationError(_))
        ));
    }

    #[test]
    fn test_reset() {
        let mut vol = RollingVolatility::new(3).unwrap();
        for price in [1.0, 2.0, 3.0] {
            vol.update(price).unwrap();
        }
        assert!(vol.is_ready());
        vol.reset();
        assert!(!vol.is_ready());
        assert_eq!(vol.window(), 3);
    }
}
