//! Fit/apply contract for record-level feature transforms.
//!
//! A [`ColumnTransform`] reads a fixed set of [`Column`]s from cleaned
//! records. `fit` learns its state from the training rows (and the target,
//! for supervised encoders); the resulting [`FittedColumnTransform`] is
//! immutable and `apply` is a pure function of that state and the rows.

use crate::preprocessing::PreprocessingError;
use crate::schema::{CleanedRecord, Column};
use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// An unfitted, column-scoped transform.
pub trait ColumnTransform: Clone + Send + Sync {
    /// State produced by [`ColumnTransform::fit`].
    type Fitted: FittedColumnTransform;

    /// Short name used in logs and feature names.
    fn name(&self) -> &'static str;

    /// Cleaned columns this transform reads.
    fn input_columns(&self) -> &'static [Column];

    /// Learn parameters from the training rows.
    ///
    /// # Errors
    /// Returns [`PreprocessingError`] on empty input, a target whose length
    /// differs from the number of rows, or invalid hyperparameters.
    fn fit(
        &self,
        records: &[CleanedRecord],
        target: &[f64],
    ) -> Result<Self::Fitted, PreprocessingError>;
}

/// A fitted transform: immutable, serializable, applied identically at
/// training and inference time.
pub trait FittedColumnTransform: Clone + Send + Sync + Serialize + DeserializeOwned {
    /// Map rows to a `(rows.len(), n_features_out())` matrix.
    fn apply(&self, records: &[CleanedRecord]) -> Result<Array2<f64>, PreprocessingError>;

    /// Names of the output columns, in output order.
    fn feature_names(&self) -> Vec<String>;

    /// Width of the output.
    fn n_features_out(&self) -> usize {
        self.feature_names().len()
    }
}

/// Build an `(n, k)` string matrix from `k` text extractors.
pub(crate) fn text_matrix(
    records: &[CleanedRecord],
    extractors: &[fn(&CleanedRecord) -> &str],
) -> Array2<String> {
    Array2::from_shape_fn((records.len(), extractors.len()), |(row, col)| {
        extractors[col](&records[row]).to_string()
    })
}

/// Build an `(n, k)` numeric matrix from `k` numeric extractors.
pub(crate) fn numeric_matrix(
    records: &[CleanedRecord],
    extractors: &[fn(&CleanedRecord) -> f64],
) -> Array2<f64> {
    Array2::from_shape_fn((records.len(), extractors.len()), |(row, col)| {
        extractors[col](&records[row])
    })
}

/// Check the target has one value per training row.
pub(crate) fn ensure_target(
    records: &[CleanedRecord],
    target: &[f64],
) -> Result<(), PreprocessingError> {
    if records.is_empty() {
        return Err(PreprocessingError::EmptyData(
            "Cannot fit a feature transform on zero rows".to_string(),
        ));
    }
    if records.len() != target.len() {
        return Err(PreprocessingError::TargetMismatch {
            rows: records.len(),
            targets: target.len(),
        });
    }
    Ok(())
}
