//! Engine configuration

use crate::data::HistoryPeriod;
use crate::error::{ForecastError, Result};
use crate::models::ForestConfig;
use crate::signals::SignalThresholds;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Closes published in [`ForecastResult::recent_history`](crate::engine::ForecastResult)
pub const RECENT_HISTORY_LEN: usize = 250;

/// Horizon used when none is given
pub const DEFAULT_HORIZON: usize = 10;

/// Commonly used horizons, in trading rows, with their display labels
pub const HORIZON_PRESETS: [(&str, usize); 4] = [
    ("7 days", 7),
    ("10 days", 10),
    ("1 month", 30),
    ("2 months", 60),
];

/// Look up a preset horizon by label
pub fn horizon_preset(label: &str) -> Option<usize> {
    HORIZON_PRESETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(label.trim()))
        .map(|&(_, rows)| rows)
}

/// Forecast engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Forest hyper-parameters
    pub forest: ForestConfig,
    /// Recommendation thresholds
    pub thresholds: SignalThresholds,
    /// Look-back requested from the provider
    pub history_period: HistoryPeriod,
    /// Number of closes kept in each result
    pub recent_history_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            thresholds: SignalThresholds::default(),
            history_period: HistoryPeriod::default(),
            recent_history_len: RECENT_HISTORY_LEN,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.forest.validate()?;
        if self.recent_history_len == 0 {
            return Err(ForecastError::InvalidParameter(
                "recent_history_len must be positive".to_string(),
            ));
        }
        if self.history_period == HistoryPeriod::Years(0) {
            return Err(ForecastError::InvalidParameter(
                "history_period must cover at least one year".to_string(),
            ));
        }
        Ok(())
    }

    /// Same configuration with a different forest seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.forest.seed = seed;
        self
    }
}
