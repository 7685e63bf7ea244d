//! Forecast engine
//!
//! Runs fetch → features → fit → predict → interval → signal for a symbol
//! and keeps the latest result per symbol for the rest of the session.
//!
//! Computation and lookup are separate: [`ForecastEngine::analyze`] always
//! recomputes, [`ForecastEngine::get_cached`] never does. Results are built
//! completely before they are inserted, so a reader sees either the previous
//! result or the new one.

use crate::config::EngineConfig;
use crate::confidence::{ConfidenceEstimator, Interval};
use crate::data::MarketDataProvider;
use crate::error::{ForecastError, Result};
use crate::features::FeaturePipeline;
use crate::models::{FittedModel, ForecastModel, RandomForest};
use crate::signals::{variation_pct, Signal, SignalClassifier, SignalInputs};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Closes shown before the projection in [`ForecastResult::projection`]
pub const DEFAULT_PROJECTION_TAIL: usize = 50;

/// Outcome of one successful analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub symbol: String,
    /// Date of the most recent observation
    pub as_of: NaiveDate,
    pub current_price: f64,
    /// Mean forecast of the ensemble
    pub target_price: f64,
    /// `target_price ± σ` of the estimators; a dispersion band, not a
    /// calibrated confidence interval
    pub interval: Interval,
    pub price_to_book: f64,
    pub moving_average_200: f64,
    pub rsi: f64,
    pub volatility: f64,
    /// Most recent retained closes, oldest first
    pub recent_history: Vec<f64>,
    /// Horizon in trading rows
    pub horizon_days: usize,
    pub signal: Signal,
    pub estimator_count: usize,
    pub training_rows: usize,
}

impl ForecastResult {
    /// Forecast variation in percent
    pub fn variation_pct(&self) -> f64 {
        variation_pct(self.current_price, self.target_price)
    }

    /// Chart-ready projection over the last `tail` closes
    pub fn projection(&self, tail: usize) -> Option<Projection> {
        let start = self.recent_history.len().saturating_sub(tail);
        let history: Vec<(f64, f64)> = self.recent_history[start..]
            .iter()
            .enumerate()
            .map(|(x, &close)| (x as f64, close))
            .collect();

        let &(last_x, last_close) = history.last()?;
        let target_x = last_x + self.horizon_days as f64;

        Some(Projection {
            history,
            origin: (last_x, last_close),
            target: (target_x, self.target_price),
            cone_low: [(last_x, last_close), (target_x, self.interval.low)],
            cone_high: [(last_x, last_close), (target_x, self.interval.high)],
        })
    }
}

/// Points needed to draw recent history and the forecast projection
///
/// The x axis counts rows: history runs `0..n`, and the target sits
/// `horizon_days` after the last close. The cone opens from zero width at the
/// last close to the interval at the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub history: Vec<(f64, f64)>,
    pub origin: (f64, f64),
    pub target: (f64, f64),
    pub cone_low: [(f64, f64); 2],
    pub cone_high: [(f64, f64); 2],
}

/// Per-symbol result of a batch run
#[derive(Debug)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub outcome: Result<Arc<ForecastResult>>,
}

impl SymbolOutcome {
    pub fn is_available(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn result(&self) -> Option<&Arc<ForecastResult>> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ForecastError> {
        self.outcome.as_ref().err()
    }
}

/// Orchestrates the forecast pipeline and owns the session cache
#[derive(Debug)]
pub struct ForecastEngine<P, M = RandomForest> {
    provider: P,
    model: M,
    pipeline: FeaturePipeline,
    estimator: ConfidenceEstimator,
    classifier: SignalClassifier,
    config: EngineConfig,
    cache: RwLock<HashMap<String, Arc<ForecastResult>>>,
}

impl<P: MarketDataProvider> ForecastEngine<P, RandomForest> {
    /// Create an engine using a random forest built from `config`
    pub fn new(provider: P, config: EngineConfig) -> Result<Self> {
        let model = RandomForest::new(config.forest.clone())?;
        Self::with_model(provider, model, config)
    }
}

impl<P: MarketDataProvider, M: ForecastModel> ForecastEngine<P, M> {
    /// Create an engine with a custom model
    pub fn with_model(provider: P, model: M, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            provider,
            model,
            pipeline: FeaturePipeline::new(),
            estimator: ConfidenceEstimator::new(),
            classifier: SignalClassifier::with_thresholds(config.thresholds),
            config,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Compute a fresh forecast for `symbol` and cache it.
    ///
    /// On failure the cache is left untouched, so an earlier result for the
    /// symbol stays available through [`get_cached`](Self::get_cached).
    pub fn analyze(&self, symbol: &str, horizon: usize) -> Result<Arc<ForecastResult>> {
        info!(symbol = %symbol, horizon, "Analyzing");

        match self.compute(symbol, horizon) {
            Ok(result) => {
                let result = Arc::new(result);
                self.cache
                    .write()
                    .insert(symbol.to_string(), Arc::clone(&result));
                info!(
                    symbol = %symbol,
                    current = result.current_price,
                    target = result.target_price,
                    recommendation = %result.signal.recommendation,
                    "Forecast ready"
                );
                Ok(result)
            }
            Err(err) => {
                warn!(symbol = %symbol, error = %err, "No forecast available");
                Err(err)
            }
        }
    }

    /// Analyze every symbol in order; a failure only affects its own outcome
    pub fn analyze_batch<S: AsRef<str>>(&self, symbols: &[S], horizon: usize) -> Vec<SymbolOutcome> {
        symbols
            .iter()
            .map(|symbol| {
                let symbol = symbol.as_ref();
                SymbolOutcome {
                    symbol: symbol.to_string(),
                    outcome: self.analyze(symbol, horizon),
                }
            })
            .collect()
    }

    /// Last successful result for `symbol`, without recomputing
    pub fn get_cached(&self, symbol: &str) -> Option<Arc<ForecastResult>> {
        self.cache.read().get(symbol).cloned()
    }

    /// Symbols with a cached result, sorted
    pub fn cached_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.cache.read().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Drop every cached result
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    fn compute(&self, symbol: &str, horizon: usize) -> Result<ForecastResult> {
        let history = self
            .provider
            .fetch_history(symbol, self.config.history_period)?;
        if history.is_empty() {
            return Err(ForecastError::DataUnavailable(format!(
                "Empty price history for {}",
                symbol
            )));
        }
        debug!(symbol = %symbol, observations = history.len(), "History fetched");

        let frame = self.pipeline.compute(&history, horizon)?;
        debug!(
            symbol = %symbol,
            retained = frame.retained_closes.len(),
            training = frame.training.len(),
            "Features computed"
        );

        let fitted = self.model.fit(&frame.training)?;
        let prediction = fitted.predict(&frame.latest)?;
        let interval = self
            .estimator
            .estimate(&prediction.estimators, prediction.point)?;
        debug!(
            symbol = %symbol,
            model = fitted.name(),
            point = prediction.point,
            low = interval.low,
            high = interval.high,
            "Model predicted"
        );

        let price_to_book = self.provider.fetch_fundamentals(symbol)?.price_to_book();

        let latest = frame.latest;
        let signal = self.classifier.classify(&SignalInputs {
            current: latest.close,
            target: prediction.point,
            interval,
            moving_average_200: latest.moving_average_200,
            rsi: latest.rsi,
            price_to_book,
        });

        let keep_from = frame
            .retained_closes
            .len()
            .saturating_sub(self.config.recent_history_len);

        Ok(ForecastResult {
            symbol: symbol.to_string(),
            as_of: latest.date,
            current_price: latest.close,
            target_price: prediction.point,
            interval,
            price_to_book,
            moving_average_200: latest.moving_average_200,
            rsi: latest.rsi,
            volatility: latest.volatility,
            recent_history: frame.retained_closes[keep_from..].to_vec(),
            horizon_days: horizon,
            signal,
            estimator_count: fitted.estimator_count(),
            training_rows: frame.training.len(),
        })
    }
}
