//! Departure/arrival times: hour and minute per column (min-max scaled),
//! then a part-of-day bucket per column (count-encoded, then min-max scaled).
//!
//! Output order:
//! `[dep_time_hour, dep_time_minute, arrival_time_hour, arrival_time_minute,
//!   dep_time_part_of_day, arrival_time_part_of_day]`.

use super::traits::{ensure_target, numeric_matrix, ColumnTransform, FittedColumnTransform};
use crate::preprocessing::{
    CountFrequencyEncoder, FittedCountFrequencyEncoder, FittedMinMaxScaler, FittedTransformer,
    MinMaxScaler, PreprocessingError, Transformer,
};
use crate::schema::{CleanedRecord, Column};
use chrono::Timelike;
use ndarray::{concatenate, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse bucket of the day an hour falls in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfDay {
    Start,
    Mid,
    End,
}

impl PartOfDay {
    pub fn label(self) -> &'static str {
        match self {
            PartOfDay::Start => "start",
            PartOfDay::Mid => "mid",
            PartOfDay::End => "end",
        }
    }
}

impl fmt::Display for PartOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Hour boundaries: `[0, mid)` is start, `[mid, end)` is mid, the rest is end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartOfDayBounds {
    pub mid: u32,
    pub end: u32,
}

impl Default for PartOfDayBounds {
    fn default() -> Self {
        Self { mid: 8, end: 16 }
    }
}

impl PartOfDayBounds {
    pub fn classify(&self, hour: u32) -> PartOfDay {
        if hour < self.mid {
            PartOfDay::Start
        } else if hour < self.end {
            PartOfDay::Mid
        } else {
            PartOfDay::End
        }
    }

    fn validate(&self) -> Result<(), PreprocessingError> {
        if self.mid > self.end || self.end > 24 {
            return Err(PreprocessingError::InvalidParameter(format!(
                "part-of-day bounds need mid <= end <= 24, got mid = {}, end = {}",
                self.mid, self.end
            )));
        }
        Ok(())
    }
}

fn dep_hour(r: &CleanedRecord) -> f64 {
    f64::from(r.dep_time.hour())
}

fn dep_minute(r: &CleanedRecord) -> f64 {
    f64::from(r.dep_time.minute())
}

fn arrival_hour(r: &CleanedRecord) -> f64 {
    f64::from(r.arrival_time.hour())
}

fn arrival_minute(r: &CleanedRecord) -> f64 {
    f64::from(r.arrival_time.minute())
}

fn clock_matrix(records: &[CleanedRecord]) -> Array2<f64> {
    numeric_matrix(records, &[dep_hour, dep_minute, arrival_hour, arrival_minute])
}

fn part_of_day_matrix(records: &[CleanedRecord], bounds: &PartOfDayBounds) -> Array2<String> {
    Array2::from_shape_fn((records.len(), 2), |(row, col)| {
        let time = if col == 0 {
            records[row].dep_time
        } else {
            records[row].arrival_time
        };
        bounds.classify(time.hour()).label().to_string()
    })
}

#[derive(Clone, Debug)]
pub struct TimeTransform {
    bounds: PartOfDayBounds,
    clock_scaler: MinMaxScaler,
    part_encoder: CountFrequencyEncoder,
    part_scaler: MinMaxScaler,
}

impl TimeTransform {
    pub fn new(bounds: PartOfDayBounds) -> Self {
        Self {
            bounds,
            clock_scaler: MinMaxScaler::new(),
            part_encoder: CountFrequencyEncoder::new(),
            part_scaler: MinMaxScaler::new(),
        }
    }
}

impl Default for TimeTransform {
    fn default() -> Self {
        Self::new(PartOfDayBounds::default())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedTimeTransform {
    bounds: PartOfDayBounds,
    clock_scaler: FittedMinMaxScaler,
    part_encoder: FittedCountFrequencyEncoder,
    part_scaler: FittedMinMaxScaler,
}

impl FittedTimeTransform {
    pub fn bounds(&self) -> PartOfDayBounds {
        self.bounds
    }
}

impl ColumnTransform for TimeTransform {
    type Fitted = FittedTimeTransform;

    fn name(&self) -> &'static str {
        "time"
    }

    fn input_columns(&self) -> &'static [Column] {
        &[Column::DepTime, Column::ArrivalTime]
    }

    fn fit(
        &self,
        records: &[CleanedRecord],
        target: &[f64],
    ) -> Result<Self::Fitted, PreprocessingError> {
        ensure_target(records, target)?;
        self.bounds.validate()?;

        let clock_scaler = self.clock_scaler.fit(&clock_matrix(records))?;
        let parts = part_of_day_matrix(records, &self.bounds);
        let part_encoder = self.part_encoder.fit(&parts)?;
        let part_scaler = self.part_scaler.fit(&part_encoder.transform(&parts)?)?;

        Ok(FittedTimeTransform {
            bounds: self.bounds,
            clock_scaler,
            part_encoder,
            part_scaler,
        })
    }
}

impl FittedColumnTransform for FittedTimeTransform {
    fn apply(&self, records: &[CleanedRecord]) -> Result<Array2<f64>, PreprocessingError> {
        let clock = self.clock_scaler.transform(&clock_matrix(records))?;
        let parts = self
            .part_scaler
            .transform(&self.part_encoder.transform(&part_of_day_matrix(records, &self.bounds))?)?;

        concatenate(Axis(1), &[clock.view(), parts.view()]).map_err(|e| {
            PreprocessingError::InvalidShape {
                expected: format!("({}, 6)", records.len()),
                got: e.to_string(),
            }
        })
    }

    fn feature_names(&self) -> Vec<String> {
        [
            "dep_time_hour",
            "dep_time_minute",
            "arrival_time_hour",
            "arrival_time_minute",
            "dep_time_part_of_day",
            "arrival_time_part_of_day",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn n_features_out(&self) -> usize {
        6
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::record_at;
    use proptest::prelude::*;

    #[test]
    fn test_part_of_day_boundaries() {
        let bounds = PartOfDayBounds::default();
        assert_eq!(bounds.classify(0), PartOfDay::Start);
        assert_eq!(bounds.classify(7), PartOfDay::Start);
        assert_eq!(bounds.classify(8), PartOfDay::Mid);
        assert_eq!(bounds.classify(15), PartOfDay::Mid);
        assert_eq!(bounds.classify(16), PartOfDay::End);
        assert_eq!(bounds.classify(23), PartOfDay::End);
    }

    #[test]
    fn test_output_layout_and_scaling() {
        let records = vec![
            record_at((2, 15), (11, 50)),
            record_at((22, 20), (1, 10)),
            record_at((9, 0), (13, 30)),
            record_at((10, 45), (18, 0)),
        ];
        let fitted = TimeTransform::default()
            .fit(&records, &[1.0; 4])
            .unwrap();
        let out = fitted.apply(&records).unwrap();

        assert_eq!(out.dim(), (4, 6));
        // dep hour: 2 -> 0, 22 -> 1
        assert!((out[[0, 0]] - 0.0).abs() < 1e-12);
        assert!((out[[1, 0]] - 1.0).abs() < 1e-12);
        // dep part of day: start x1, end x1, mid x2 -> counts [1, 1, 2, 2] -> [0, 0, 1, 1]
        assert_eq!(out.column(4).to_vec(), vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(fitted.feature_names()[4], "dep_time_part_of_day");
    }

    #[test]
    fn test_invalid_bounds() {
        let records = vec![record_at((2, 15), (11, 50))];
        let result = TimeTransform::new(PartOfDayBounds { mid: 18, end: 10 }).fit(&records, &[1.0]);
        assert!(matches!(result, Err(PreprocessingError::InvalidParameter(_))));
    }

    proptest! {
        #[test]
        fn prop_classify_matches_bounds(hour in 0u32..24, mid in 0u32..=24, extra in 0u32..=24) {
            let end = (mid + extra).min(24);
            let bounds = PartOfDayBounds { mid, end };
            let expected = if hour < mid {
                PartOfDay::Start
            } else if hour < end {
                PartOfDay::Mid
            } else {
                PartOfDay::End
            };
            prop_assert_eq!(bounds.classify(hour), expected);
        }
    }
}
