//! Random forest regressor
//!
//! A bagged ensemble of regression trees. Each tree is grown on a bootstrap
//! resample of the training set; the forest predicts the mean of its trees
//! and also exposes every tree's prediction so callers can measure how much
//! the trees disagree.

use crate::error::{ForecastError, Result};
use crate::features::{FeatureRow, TrainingSet, FEATURE_COUNT};
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::{EnsemblePrediction, FittedModel, ForecastModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Forest hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees
    pub n_estimators: usize,
    /// Seed of the random generator driving resampling and feature order
    pub seed: u64,
    /// Resample rows with replacement for each tree
    pub bootstrap: bool,
    /// Maximum tree depth, unbounded when `None`
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features evaluated per split, all of them when `None`
    pub max_features: Option<usize>,
    /// Smallest training set accepted by `fit`
    pub min_training_rows: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            seed: 42,
            bootstrap: true,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            min_training_rows: 1,
        }
    }
}

impl ForestConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "n_estimators must be positive".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(ForecastError::InvalidParameter(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_samples_leaf must be positive".to_string(),
            ));
        }
        if let Some(max_features) = self.max_features {
            if max_features == 0 || max_features > FEATURE_COUNT {
                return Err(ForecastError::InvalidParameter(format!(
                    "max_features must be between 1 and {}",
                    FEATURE_COUNT
                )));
            }
        }
        if self.max_depth == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "max_depth must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features.unwrap_or(FEATURE_COUNT),
        }
    }
}

/// Unfitted random forest
#[derive(Debug, Clone)]
pub struct RandomForest {
    name: String,
    config: ForestConfig,
}

impl RandomForest {
    /// Create a forest with the given configuration
    pub fn new(config: ForestConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: format!("RandomForest(n={})", config.n_estimators),
            config,
        })
    }

    /// Same configuration with a different seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        let config = ForestConfig::default();
        Self {
            name: format!("RandomForest(n={})", config.n_estimators),
            config,
        }
    }
}

impl ForecastModel for RandomForest {
    type Fitted = FittedForest;

    fn fit(&self, training: &TrainingSet) -> Result<FittedForest> {
        let required = self.config.min_training_rows.max(1);
        if training.len() < required {
            return Err(ForecastError::InsufficientTrainingData {
                required,
                actual: training.len(),
            });
        }

        let x = training.features();
        let y = training.targets();
        let n = x.len();
        let params = self.config.tree_params();

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let trees = (0..self.config.n_estimators)
            .map(|_| {
                // every tree gets its own stream so trees do not depend on
                // how much randomness earlier trees consumed
                let mut tree_rng = StdRng::seed_from_u64(rng.gen());
                let sample: Vec<usize> = if self.config.bootstrap {
                    (0..n).map(|_| tree_rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree::fit(&x, &y, sample, &params, &mut tree_rng)
            })
            .collect();

        Ok(FittedForest {
            name: self.name.clone(),
            trees,
            training_rows: n,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fitted random forest
#[derive(Debug, Clone)]
pub struct FittedForest {
    name: String,
    trees: Vec<RegressionTree>,
    training_rows: usize,
}

impl FittedForest {
    /// Rows the forest was fitted on
    pub fn training_rows(&self) -> usize {
        self.training_rows
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}

impl FittedModel for FittedForest {
    fn predict(&self, row: &FeatureRow) -> Result<EnsemblePrediction> {
        let features = row.features();
        if features.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidData(format!(
                "Non-finite feature in row for {}",
                row.date
            )));
        }

        let estimators: Vec<f64> = self.trees.iter().map(|t| t.predict(&features)).collect();
        let point = Statistics::mean(&estimators);

        Ok(EnsemblePrediction { point, estimators })
    }

    fn estimator_count(&self) -> usize {
        self.trees.len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
