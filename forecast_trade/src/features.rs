//! Feature pipeline
//!
//! Derives the technical indicators the forest learns from and the
//! horizon-shifted target.
//!
//! Rows are first filtered to those where every indicator is defined, and
//! the target is then shifted by `horizon` rows *within the filtered series*.
//! Because the 200-day average has the longest warm-up, the filter drops the
//! first 199 rows before the shift is applied. The shift counts rows, not
//! calendar days, so gaps in the series are not interpolated.

use crate::data::PriceHistory;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use trade_math::{rolling_volatility_series, rsi_series, sma_series};

/// RSI look-back in observations
pub const RSI_PERIOD: usize = 14;
/// Rolling volatility window in observations
pub const VOLATILITY_WINDOW: usize = 20;
/// Long moving average length in observations
pub const MOVING_AVERAGE_WINDOW: usize = 200;
/// Shortest history the pipeline accepts
pub const MIN_HISTORY: usize = 200;
/// Number of model inputs per row
pub const FEATURE_COUNT: usize = 3;
/// Names of the model inputs, in [`FeatureRow::features`] order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = ["close", "rsi", "volatility"];

/// Indicators derived for one observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub close: f64,
    pub rsi: f64,
    pub volatility: f64,
    pub moving_average_200: f64,
}

impl FeatureRow {
    /// Model input vector `(close, rsi, volatility)`
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [self.close, self.rsi, self.volatility]
    }
}

/// A feature row paired with the close `horizon` rows later
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub row: FeatureRow,
    pub target: f64,
}

/// Chronologically ordered training samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    samples: Vec<TrainingSample>,
}

impl TrainingSet {
    pub fn new(samples: Vec<TrainingSample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[TrainingSample] {
        &self.samples
    }

    /// Feature matrix, one row per sample
    pub fn features(&self) -> Vec<[f64; FEATURE_COUNT]> {
        self.samples.iter().map(|s| s.row.features()).collect()
    }

    pub fn targets(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.target).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Everything the pipeline derives from one history
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    /// Samples that have a target
    pub training: TrainingSet,
    /// Most recent retained row, used as prediction input
    pub latest: FeatureRow,
    /// Closes of every retained row, oldest first
    pub retained_closes: Vec<f64>,
}

/// Computes indicator rows and training samples from a price history
#[derive(Debug, Clone, Copy, Default)]
pub struct FeaturePipeline;

impl FeaturePipeline {
    pub fn new() -> Self {
        Self
    }

    /// Derive the training set and the latest feature row for `horizon`
    pub fn compute(&self, history: &PriceHistory, horizon: usize) -> Result<FeatureFrame> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Horizon must be a positive number of rows".to_string(),
            ));
        }
        if history.len() < MIN_HISTORY {
            return Err(ForecastError::InsufficientHistory {
                required: MIN_HISTORY,
                actual: history.len(),
            });
        }

        let rows = Self::indicator_rows(history)?;
        let Some(latest) = rows.last().copied() else {
            return Err(ForecastError::InsufficientHistory {
                required: MIN_HISTORY,
                actual: history.len(),
            });
        };

        let samples = rows
            .iter()
            .zip(rows.iter().skip(horizon))
            .map(|(row, future)| TrainingSample {
                row: *row,
                target: future.close,
            })
            .collect();

        Ok(FeatureFrame {
            training: TrainingSet::new(samples),
            latest,
            retained_closes: rows.iter().map(|r| r.close).collect(),
        })
    }

    /// Rows where RSI, volatility and the 200-day average are all defined.
    ///
    /// Indicators run over the full history before any row is dropped.
    pub fn indicator_rows(history: &PriceHistory) -> Result<Vec<FeatureRow>> {
        let closes = history.closes();
        let rsi = rsi_series(&closes, RSI_PERIOD)?;
        let volatility = rolling_volatility_series(&closes, VOLATILITY_WINDOW)?;
        let moving_average = sma_series(&closes, MOVING_AVERAGE_WINDOW)?;

        let rows = history
            .points()
            .iter()
            .enumerate()
            .filter_map(|(i, point)| {
                Some(FeatureRow {
                    date: point.date,
                    close: point.close,
                    rsi: rsi[i]?,
                    volatility: volatility[i]?,
                    moving_average_200: moving_average[i]?,
                })
            })
            .collect();

        Ok(rows)
    }
}
