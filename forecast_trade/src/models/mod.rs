//! Forecasting models
//!
//! A [`ForecastModel`] is an unfitted description; fitting it returns a
//! separate [`FittedModel`] value that owns everything `predict` needs.

use crate::error::Result;
use crate::features::{FeatureRow, TrainingSet};
use std::fmt::Debug;

/// Aggregate and per-estimator predictions for one feature row
#[derive(Debug, Clone, PartialEq)]
pub struct EnsemblePrediction {
    /// Mean of the estimators
    pub point: f64,
    /// Every estimator's prediction, in estimator order
    pub estimators: Vec<f64>,
}

/// Fitted forecast model
pub trait FittedModel: Debug {
    /// Predict the target for one feature row
    fn predict(&self, row: &FeatureRow) -> Result<EnsemblePrediction>;

    /// Number of estimators contributing to a prediction
    fn estimator_count(&self) -> usize;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be fitted on a training set
pub trait ForecastModel: Debug + Clone {
    /// The type of fitted model produced
    type Fitted: FittedModel;

    /// Fit the model on a training set
    fn fit(&self, training: &TrainingSet) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod forest;
pub mod tree;

pub use forest::{FittedForest, ForestConfig, RandomForest};
