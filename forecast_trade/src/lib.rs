//! # Forecast Trade
//!
//! Price forecasting and trading signals for a single instrument.
//!
//! ## Pipeline
//!
//! ```text
//! price history ─► FeaturePipeline ─► RandomForest::fit ─► FittedForest::predict
//!                                                             │
//!                         SignalClassifier ◄─ ConfidenceEstimator
//!                                │
//!                         ForecastEngine cache
//! ```
//!
//! - **Features**: 14-period RSI, 20-observation annualized volatility and
//!   the 200-day moving average, with a target `horizon` rows ahead
//! - **Model**: bagged ensemble of 100 regression trees, reproducible under a
//!   fixed seed
//! - **Interval**: forecast ± the standard deviation of the trees'
//!   predictions (a dispersion band, not a calibrated confidence level)
//! - **Signal**: ordered rules mapping forecast, trend and valuation to a
//!   [`Recommendation`]
//!
//! ## Quick Start
//!
//! ```rust
//! use forecast_trade::{EngineConfig, ForecastEngine, InMemoryProvider};
//! use forecast_trade::utils::generate_test_history;
//!
//! let history = generate_test_history(600, 25.0, 0.012, 7)?;
//! let provider = InMemoryProvider::new().with_history("DEMO", history);
//! let engine = ForecastEngine::new(provider, EngineConfig::default())?;
//!
//! let result = engine.analyze("DEMO", 10)?;
//! assert!(result.interval.contains(result.target_price));
//! assert!(engine.get_cached("DEMO").is_some());
//! # Ok::<(), forecast_trade::ForecastError>(())
//! ```

pub mod config;
pub mod confidence;
pub mod data;
pub mod engine;
pub mod error;
pub mod features;
pub mod models;
pub mod signals;
pub mod utils;

// Re-export commonly used types
pub use crate::config::EngineConfig;
pub use crate::confidence::{ConfidenceEstimator, Interval};
pub use crate::data::{
    CsvProvider, Fundamentals, HistoryPeriod, InMemoryProvider, MarketDataProvider, PriceHistory,
    PricePoint,
};
pub use crate::engine::{ForecastEngine, ForecastResult, Projection, SymbolOutcome};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{FeatureFrame, FeaturePipeline, FeatureRow, TrainingSet};
pub use crate::models::{
    EnsemblePrediction, FittedModel, ForecastModel, ForestConfig, RandomForest,
};
pub use crate::signals::{Recommendation, Signal, SignalClassifier, SignalInputs};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
