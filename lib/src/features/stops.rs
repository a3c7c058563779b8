//! Stops: 1.0 for a direct flight, 0.0 otherwise.

use super::traits::{ensure_target, ColumnTransform, FittedColumnTransform};
use crate::preprocessing::PreprocessingError;
use crate::schema::{CleanedRecord, Column};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub fn is_direct_flight(total_stops: u32) -> bool {
    total_stops == 0
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DirectFlightTransform;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FittedDirectFlightTransform;

impl ColumnTransform for DirectFlightTransform {
    type Fitted = FittedDirectFlightTransform;

    fn name(&self) -> &'static str {
        "stops"
    }

    fn input_columns(&self) -> &'static [Column] {
        &[Column::TotalStops]
    }

    fn fit(
        &self,
        records: &[CleanedRecord],
        target: &[f64],
    ) -> Result<Self::Fitted, PreprocessingError> {
        ensure_target(records, target)?;
        Ok(FittedDirectFlightTransform)
    }
}

impl FittedColumnTransform for FittedDirectFlightTransform {
    fn apply(&self, records: &[CleanedRecord]) -> Result<Array2<f64>, PreprocessingError> {
        Ok(Array2::from_shape_fn((records.len(), 1), |(row, _)| {
            if is_direct_flight(records[row].total_stops) {
                1.0
            } else {
                0.0
            }
        }))
    }

    fn feature_names(&self) -> Vec<String> {
        vec!["is_direct_flight".to_string()]
    }

    fn n_features_out(&self) -> usize {
        1
    }
}
