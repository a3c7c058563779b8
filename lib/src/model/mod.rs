//! Regression estimators.
//!
//! Estimators follow the same unfitted/fitted split as the preprocessing
//! transformers: a [`Regressor`] carries hyperparameters only, and
//! [`Regressor::fit`] returns an immutable, serializable [`FittedRegressor`]
//! that holds nothing but what prediction needs.
//!
//! The only estimator is a bagged CART forest, [`RandomForestRegressor`].

pub mod decision_tree;
pub mod random_forest;

pub use decision_tree::{DecisionTreeRegressor, FittedDecisionTree, TreeConfig, TreeNode};
pub use random_forest::{FittedRandomForest, ForestConfig, MaxFeatures, RandomForestRegressor};

use crate::error::{FareError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// An unfitted regression estimator.
pub trait Regressor {
    type Fitted: FittedRegressor;

    /// Learn from a `(n_samples, n_features)` matrix and one target per row.
    ///
    /// # Errors
    /// [`FareError::Model`] on empty input, a target of the wrong length,
    /// or non-finite values.
    fn fit(&self, x: ArrayView2<f64>, y: &[f64]) -> Result<Self::Fitted>;
}

/// A fitted estimator, ready for inference.
pub trait FittedRegressor: Clone + Send + Sync + Serialize + DeserializeOwned {
    /// Predict one feature row. The row width is not checked.
    fn predict_one(&self, row: ArrayView1<f64>) -> f64;

    /// Number of features seen during fit.
    fn n_features_in(&self) -> usize;

    /// Predict every row of `x`.
    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.n_features_in() {
            return Err(FareError::Model(format!(
                "expected {} features, got {}",
                self.n_features_in(),
                x.ncols()
            )));
        }
        Ok(x.rows().into_iter().map(|row| self.predict_one(row)).collect())
    }
}

/// Shared input checks for `fit`.
pub(crate) fn ensure_training_data(x: ArrayView2<f64>, y: &[f64]) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(FareError::Model(format!(
            "cannot fit on an empty matrix of shape ({}, {})",
            x.nrows(),
            x.ncols()
        )));
    }
    if x.nrows() != y.len() {
        return Err(FareError::Model(format!(
            "{} rows but {} targets",
            x.nrows(),
            y.len()
        )));
    }
    if let Some(((row, col), value)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(FareError::Model(format!(
            "non-finite feature value {} at row {}, column {}",
            value, row, col
        )));
    }
    if let Some((row, value)) = y.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(FareError::Model(format!(
            "non-finite target {} at row {}",
            value, row
        )));
    }
    Ok(())
}
