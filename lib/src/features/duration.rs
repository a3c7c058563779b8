//! Duration: natural log of the minutes in the air.

use super::traits::{ensure_target, ColumnTransform, FittedColumnTransform};
use crate::preprocessing::PreprocessingError;
use crate::schema::{CleanedRecord, Column};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

const FEATURE: &str = "duration_minute_log";

/// Stateless; fitting only checks the input.
#[derive(Clone, Copy, Debug, Default)]
pub struct DurationLogTransform;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FittedDurationLogTransform;

impl ColumnTransform for DurationLogTransform {
    type Fitted = FittedDurationLogTransform;

    fn name(&self) -> &'static str {
        "duration"
    }

    fn input_columns(&self) -> &'static [Column] {
        &[Column::DurationMinute]
    }

    fn fit(
        &self,
        records: &[CleanedRecord],
        target: &[f64],
    ) -> Result<Self::Fitted, PreprocessingError> {
        ensure_target(records, target)?;
        let fitted = FittedDurationLogTransform;
        fitted.apply(records)?;
        Ok(fitted)
    }
}

impl FittedColumnTransform for FittedDurationLogTransform {
    /// # Errors
    /// [`PreprocessingError::NonFinite`] for a zero duration (`ln 0 = -inf`).
    fn apply(&self, records: &[CleanedRecord]) -> Result<Array2<f64>, PreprocessingError> {
        let mut out = Array2::zeros((records.len(), 1));
        for (row, record) in records.iter().enumerate() {
            let value = f64::from(record.duration_minute).ln();
            if !value.is_finite() {
                return Err(PreprocessingError::NonFinite {
                    feature: FEATURE.to_string(),
                    row,
                    value,
                });
            }
            out[[row, 0]] = value;
        }
        Ok(out)
    }

    fn feature_names(&self) -> Vec<String> {
        vec![FEATURE.to_string()]
    }

    fn n_features_out(&self) -> usize {
        1
    }
}
