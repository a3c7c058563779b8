//! Random forest regressor: bootstrap-sampled CART trees, averaged.

use super::decision_tree::{DecisionTreeRegressor, FittedDecisionTree, TreeConfig};
use super::{ensure_training_data, FittedRegressor, Regressor};
use crate::error::{FareError, Result};
use ndarray::{ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Number of features considered at each split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    All,
    Sqrt,
    /// Share of the feature count, in (0, 1].
    Fraction(f64),
}

impl MaxFeatures {
    /// Resolve against a feature count; always at least 1.
    pub fn resolve(&self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Fraction(f) => (f * n_features as f64) as usize,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Forest hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    /// Fit each tree on a bootstrap sample of the rows.
    pub bootstrap: bool,
    /// Tree `i` is seeded with `seed + i`.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 150,
            max_depth: 20,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Fraction(0.5),
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(FareError::Config("model.n_trees must be at least 1".to_string()));
        }
        if self.min_samples_split < 2 {
            return Err(FareError::Config(
                "model.min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(FareError::Config(
                "model.min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if let MaxFeatures::Fraction(f) = self.max_features {
            if !(f > 0.0 && f <= 1.0) {
                return Err(FareError::Config(format!(
                    "model.max_features fraction must be in (0, 1], got {}",
                    f
                )));
            }
        }
        Ok(())
    }
}

/// Unfitted random forest.
///
/// # Example
/// ```ignore
/// use flight_fare::model::{ForestConfig, RandomForestRegressor, Regressor, FittedRegressor};
///
/// let forest = RandomForestRegressor::new(ForestConfig { n_trees: 20, ..Default::default() });
/// let fitted = forest.fit(x_train.view(), &y_train)?;
/// let predictions = fitted.predict(x_test.view())?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RandomForestRegressor {
    config: ForestConfig,
}

impl RandomForestRegressor {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

impl Regressor for RandomForestRegressor {
    type Fitted = FittedRandomForest;

    fn fit(&self, x: ArrayView2<f64>, y: &[f64]) -> Result<FittedRandomForest> {
        self.config.validate()?;
        ensure_training_data(x, y)?;

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let max_features = self.config.max_features.resolve(n_features);
        info!(
            n_trees = self.config.n_trees,
            n_samples,
            n_features,
            max_features,
            "fitting random forest"
        );

        let trees: Vec<FittedDecisionTree> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|i| {
                let seed = self.config.seed.wrapping_add(i as u64);
                let tree = DecisionTreeRegressor::new(TreeConfig {
                    max_depth: self.config.max_depth,
                    min_samples_split: self.config.min_samples_split,
                    min_samples_leaf: self.config.min_samples_leaf,
                    max_features: Some(max_features),
                    seed,
                });
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let rows: Vec<usize> = if self.config.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };
                tree.fit_rows(x, y, rows, &mut rng)
            })
            .collect();

        let mut feature_importances = vec![0.0; n_features];
        for tree in &trees {
            for (total, imp) in feature_importances.iter_mut().zip(tree.feature_importances()) {
                *total += imp;
            }
        }
        let sum: f64 = feature_importances.iter().sum();
        if sum > 0.0 {
            feature_importances.iter_mut().for_each(|imp| *imp /= sum);
        }

        debug!(
            mean_depth = trees.iter().map(|t| t.depth()).sum::<usize>() as f64 / trees.len() as f64,
            "random forest fitted"
        );
        Ok(FittedRandomForest {
            trees,
            n_features_in: n_features,
            feature_importances,
        })
    }
}

/// Fitted random forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedRandomForest {
    trees: Vec<FittedDecisionTree>,
    n_features_in: usize,
    feature_importances: Vec<f64>,
}

impl FittedRandomForest {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[FittedDecisionTree] {
        &self.trees
    }

    /// Mean normalized squared-error reduction per feature; sums to 1
    /// unless every tree is a single leaf.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Features paired with their importance, most important first.
    pub fn ranked_importances<'a>(&self, feature_names: &'a [String]) -> Vec<(&'a str, f64)> {
        let mut ranked: Vec<(&str, f64)> = feature_names
            .iter()
            .map(String::as_str)
            .zip(self.feature_importances.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

impl FittedRegressor for FittedRandomForest {
    fn predict_one(&self, row: ArrayView1<f64>) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict_one(row)).sum();
        total / self.trees.len() as f64
    }

    fn n_features_in(&self) -> usize {
        self.n_features_in
    }
}
