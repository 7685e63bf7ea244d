//! Oscillator indicator implementations
//!
//! Contains the Relative Strength Index (RSI) with Wilder smoothing.

use crate::{ensure_finite, MathError, Result};

/// Relative Strength Index (RSI) implementation
///
/// Average gains and losses follow Wilder's recursive smoothing with weight
/// `1 / period`. The averages are seeded at the very first price with a zero
/// gain and loss, so the indicator becomes defined after `period`
/// observations, leaving `period - 1` leading values undefined.
#[derive(Debug, Clone)]
pub struct RelativeStrengthIndex {
    period: usize,
    previous_price: Option<f64>,
    avg_gain: f64,
    avg_loss: f64,
    values_seen: usize,
}

impl RelativeStrengthIndex {
    /// Create a new RSI with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            previous_price: None,
            avg_gain: 0.0,
            avg_loss: 0.0,
            values_seen: 0,
        })
    }

    /// Update the RSI with a new price value
    pub fn update(&mut self, price: f64) -> Result<()> {
        ensure_finite(price)?;

        // The first observation has no change; it counts as zero gain and loss
        let change = self.previous_price.map_or(0.0, |prev| price - prev);
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        if self.values_seen == 0 {
            self.avg_gain = gain;
            self.avg_loss = loss;
        } else {
            // new_avg = (prev_avg * (period - 1) + current_value) / period
            let period = self.period as f64;
            self.avg_gain = (self.avg_gain * (period - 1.0) + gain) / period;
            self.avg_loss = (self.avg_loss * (period - 1.0) + loss) / period;
        }

        self.values_seen += 1;
        self.previous_price = Some(price);

        Ok(())
    }

    /// Whether enough observations have been seen to report a value
    pub fn is_ready(&self) -> bool {
        self.values_seen >= self.period
    }

    /// Get the current RSI value (0-100)
    pub fn value(&self) -> Result<f64> {
        if !self.is_ready() {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for RSI calculation. Need {} values, have {}.",
                self.period, self.values_seen
            )));
        }

        if self.avg_loss == 0.0 {
            return Ok(100.0); // If no losses, RSI is 100
        }

        let rs = self.avg_gain / self.avg_loss;
        Ok(100.0 - (100.0 / (1.0 + rs)))
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the RSI, clearing all values
    pub fn reset(&mut self) {
        self.previous_price = None;
        self.avg_gain = 0.0;
        self.avg_loss = 0.0;
        self.values_seen = 0;
    }
}

/// RSI for every observation of `prices`.
///
/// The first `period - 1` entries are `None`.
pub fn rsi_series(prices: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut rsi = RelativeStrengthIndex::new(period)?;
    let mut series = Vec::with_capacity(prices.len());

    for &price in prices {
        rsi.update(price)?;
        series.push(if rsi.is_ready() {
            Some(rsi.value()?)
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
    fn test_rsi_wilder_smoothing() {
        let mut rsi = RelativeStrengthIndex::new(3).unwrap();

        rsi.update(1.0).unwrap();
        rsi.update(2.0).unwrap();
        assert!(rsi.value().is_err());

        // avg_gain = 2/9, avg_loss = 1/3
        rsi.update(1.0).unwrap();
        assert_relative_eq!(rsi.value().unwrap(), 40.0, epsilon = 1e-9);

        // avg_gain = 13/27, avg_loss = 6/27
        rsi.update(2.0).unwrap();
        assert_relative_eq!(rsi.value().unwrap(), 100.0 - 600.0 / 19.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rsi_without_losses_is_100() {
        let prices: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
        let series = rsi_series(&prices, 14).unwrap();
        assert_eq!(series[19], Some(100.0));
    }

    #[test]
    fn test_rsi_flat_series_is_100() {
        let series = rsi_series(&[5.0; 16], 14).unwrap();
        assert_eq!(series[15], Some(100.0));
    }

    #[test]
    fn test_rsi_without_gains_is_0() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let series = rsi_series(&prices, 14).unwrap();
        assert_relative_eq!(series[19].unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rsi_series_warm_up() {
        let prices: Vec<f64> = (0..60).map(|i| 50.0 + (i as f64 * 0.7).sin() * 3.0).collect();
        let series = rsi_series(&prices, 14).unwrap();

        assert_eq!(warm_up_len(&series), 13);
        for value in series[13..].iter().flatten() {
            assert!((0.0..=100.0).contains(value));
        }
    }

    #[test]
    fn test_rsi_reset() {
        let mut rsi = RelativeStrengthIndex::new(2).unwrap();
        rsi.update(1.0).unwrap();
        rsi.update(2.0).unwrap();
        assert!(rsi.is_ready());

        rsi.reset();
        assert!(!rsi.is_ready());
        assert_eq!(rsi.period(), 2);
    }

    #[test]
    fn test_rsi_invalid_input() {
        assert!(RelativeStrengthIndex::new(0).is_err());

        let mut rsi = RelativeStrengthIndex::new(14).unwrap();
        assert!(matches!(
            rsi.update(f64::INFINITY),
            Err(MathError::InvalidInput(_))
        ));
    }
}
