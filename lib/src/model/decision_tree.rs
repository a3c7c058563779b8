//! CART regression tree.
//!
//! Splits minimize the summed squared error of the two children. For every
//! candidate feature the node's rows are sorted once and scanned left to
//! right with running sums of `y` and `y²`, so each threshold is scored in
//! constant time.

use super::{ensure_training_data, FittedRegressor, Regressor};
use crate::error::Result;
use ndarray::{ArrayView1, ArrayView2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Hyperparameters of a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features sampled at each split; `None` considers all of them.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 20,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

/// A node of a fitted tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    /// Rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

/// Unfitted regression tree.
#[derive(Debug, Clone, Default)]
pub struct DecisionTreeRegressor {
    config: TreeConfig,
}

impl DecisionTreeRegressor {
    pub fn new(config: TreeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Fit on a subset of rows, which may repeat (bootstrap samples).
    pub(crate) fn fit_rows(
        &self,
        x: ArrayView2<f64>,
        y: &[f64],
        rows: Vec<usize>,
        rng: &mut ChaCha8Rng,
    ) -> FittedDecisionTree {
        let n_features = x.ncols();
        let max_features = self
            .config
            .max_features
            .unwrap_or(n_features)
            .clamp(1, n_features);

        let mut builder = TreeBuilder {
            x,
            y,
            config: &self.config,
            max_features,
            importances: vec![0.0; n_features],
            rng,
        };
        let root = builder.build(rows, 0);

        let mut feature_importances = builder.importances;
        let total: f64 = feature_importances.iter().sum();
        if total > 0.0 {
            feature_importances.iter_mut().for_each(|imp| *imp /= total);
        }

        FittedDecisionTree {
            root,
            n_features_in: n_features,
            feature_importances,
        }
    }
}

impl Regressor for DecisionTreeRegressor {
    type Fitted = FittedDecisionTree;

    fn fit(&self, x: ArrayView2<f64>, y: &[f64]) -> Result<FittedDecisionTree> {
        ensure_training_data(x, y)?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        Ok(self.fit_rows(x, y, (0..x.nrows()).collect(), &mut rng))
    }
}

/// Fitted regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedDecisionTree {
    root: TreeNode,
    n_features_in: usize,
    /// Normalized total squared-error reduction per feature.
    feature_importances: Vec<f64>,
}

impl FittedDecisionTree {
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

impl FittedRegressor for FittedDecisionTree {
    fn predict_one(&self, row: ArrayView1<f64>) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    fn n_features_in(&self) -> usize {
        self.n_features_in
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    /// Squared error of the parent minus that of both children.
    gain: f64,
}

struct TreeBuilder<'x, 'a, 'r> {
    x: ArrayView2<'x, f64>,
    y: &'a [f64],
    config: &'a TreeConfig,
    max_features: usize,
    importances: Vec<f64>,
    rng: &'r mut ChaCha8Rng,
}

impl TreeBuilder<'_, '_, '_> {
    fn build(&mut self, rows: Vec<usize>, depth: usize) -> TreeNode {
        let n = rows.len();
        let (sum, sum_sq) = rows.iter().fold((0.0, 0.0), |(s, sq), &i| {
            (s + self.y[i], sq + self.y[i] * self.y[i])
        });
        let value = sum / n as f64;
        let sse = sum_sq - sum * sum / n as f64;

        if depth >= self.config.max_depth
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
            || sse <= 1e-12
        {
            return TreeNode::Leaf {
                value,
                n_samples: n,
            };
        }

        let Some(split) = self.best_split(&rows, sum, sum_sq, sse) else {
            return TreeNode::Leaf {
                value,
                n_samples: n,
            };
        };
        self.importances[split.feature] += split.gain;

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&i| self.x[[i, split.feature]] <= split.threshold);

        let left = self.build(left_rows, depth + 1);
        let right = self.build(right_rows, depth + 1);
        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Features are visited in shuffled order. Constant features do not count
    /// towards `max_features`, and the search continues past `max_features`
    /// until some feature yields a valid split.
    fn best_split(&mut self, rows: &[usize], sum: f64, sum_sq: f64, sse: f64) -> Option<BestSplit> {
        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        features.shuffle(&mut *self.rng);

        let mut best: Option<BestSplit> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(rows.len());
        let mut n_visited = 0;
        for feature in features {
            if n_visited >= self.max_features && best.is_some() {
                break;
            }
            pairs.clear();
            pairs.extend(rows.iter().map(|&i| (self.x[[i, feature]], self.y[i])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
            if pairs[0].0 >= pairs[pairs.len() - 1].0 {
                continue;
            }
            n_visited += 1;

            if let Some(candidate) = self.scan_feature(feature, &pairs, sum, sum_sq, sse) {
                if best.as_ref().map_or(true, |b| candidate.gain > b.gain) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    /// Best threshold on one feature; `pairs` is sorted by feature value.
    fn scan_feature(
        &self,
        feature: usize,
        pairs: &[(f64, f64)],
        sum: f64,
        sum_sq: f64,
        sse: f64,
    ) -> Option<BestSplit> {
        let n = pairs.len();
        let min_leaf = self.config.min_samples_leaf;

        let mut best: Option<BestSplit> = None;
        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for i in 0..n - 1 {
            let (value, target) = pairs[i];
            left_sum += target;
            left_sq += target * target;

            let n_left = i + 1;
            let n_right = n - n_left;
            if n_left < min_leaf || n_right < min_leaf || value >= pairs[i + 1].0 {
                continue;
            }

            let right_sum = sum - left_sum;
            let right_sq = sum_sq - left_sq;
            let children = (left_sq - left_sum * left_sum / n_left as f64)
                + (right_sq - right_sum * right_sum / n_right as f64);
            let gain = sse - children;

            if gain > best.as_ref().map_or(1e-12, |b| b.gain) {
                best = Some(BestSplit {
                    feature,
                    threshold: (value + pairs[i + 1].0) / 2.0,
                    gain,
                });
            }
        }
        best
    }
}
