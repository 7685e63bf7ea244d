//! Forecast interval from ensemble disagreement
//!
//! The interval is `point ± σ`, where σ is the population standard deviation
//! of the per-estimator predictions. It is a dispersion indicator: it says
//! how much the estimators disagree, not that the outcome falls inside it
//! with any particular probability.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Symmetric band around a point forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Band collapsed onto a single value
    pub fn point(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

/// Derives the forecast interval from per-estimator predictions
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceEstimator;

impl ConfidenceEstimator {
    pub fn new() -> Self {
        Self
    }

    /// `point ± σ` of the estimator predictions.
    ///
    /// When every estimator agrees, σ is zero and the interval collapses onto
    /// `point`.
    pub fn estimate(&self, estimators: &[f64], point: f64) -> Result<Interval> {
        if estimators.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "At least one estimator prediction is required".to_string(),
            ));
        }
        if !point.is_finite() || estimators.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidData(
                "Predictions must be finite".to_string(),
            ));
        }

        let sigma = Self::dispersion(estimators);
        Ok(Interval::new(point - sigma, point + sigma))
    }

    /// Population standard deviation of the predictions
    pub fn dispersion(estimators: &[f64]) -> f64 {
        let Some(&first) = estimators.first() else {
            return 0.0;
        };
        if estimators.iter().all(|&v| v == first) {
            return 0.0;
        }
        Statistics::population_std_dev(estimators)
    }
}
