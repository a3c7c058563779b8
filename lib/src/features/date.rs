//! Journey date: month, day of week and day of year, min-max scaled.

use super::traits::{ensure_target, ColumnTransform, FittedColumnTransform};
use crate::preprocessing::{
    FittedMinMaxScaler, FittedTransformer, MinMaxScaler, PreprocessingError, Transformer,
};
use crate::schema::{CleanedRecord, Column};
use chrono::{Datelike, NaiveDate};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// A calendar component extracted from the journey date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFeature {
    /// 1..=12
    Month,
    /// Monday = 0 .. Sunday = 6
    DayOfWeek,
    /// 1..=366
    DayOfYear,
}

impl DateFeature {
    pub fn extract(self, date: NaiveDate) -> f64 {
        let value = match self {
            DateFeature::Month => date.month(),
            DateFeature::DayOfWeek => date.weekday().num_days_from_monday(),
            DateFeature::DayOfYear => date.ordinal(),
        };
        f64::from(value)
    }

    pub fn name(self) -> &'static str {
        match self {
            DateFeature::Month => "month",
            DateFeature::DayOfWeek => "day_of_week",
            DateFeature::DayOfYear => "day_of_year",
        }
    }
}

fn date_matrix(records: &[CleanedRecord], features: &[DateFeature]) -> Array2<f64> {
    Array2::from_shape_fn((records.len(), features.len()), |(row, col)| {
        features[col].extract(records[row].date_of_journey)
    })
}

#[derive(Clone, Debug)]
pub struct DateTransform {
    features: Vec<DateFeature>,
    scaler: MinMaxScaler,
}

impl Default for DateTransform {
    fn default() -> Self {
        Self {
            features: vec![
                DateFeature::Month,
                DateFeature::DayOfWeek,
                DateFeature::DayOfYear,
            ],
            scaler: MinMaxScaler::new(),
        }
    }
}

impl DateTransform {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedDateTransform {
    features: Vec<DateFeature>,
    scaler: FittedMinMaxScaler,
}

impl ColumnTransform for DateTransform {
    type Fitted = FittedDateTransform;

    fn name(&self) -> &'static str {
        "date"
    }

    fn input_columns(&self) -> &'static [Column] {
        &[Column::DateOfJourney]
    }

    fn fit(
        &self,
        records: &[CleanedRecord],
        target: &[f64],
    ) -> Result<Self::Fitted, PreprocessingError> {
        ensure_target(records, target)?;
        let scaler = self.scaler.fit(&date_matrix(records, &self.features))?;
        Ok(FittedDateTransform {
            features: self.features.clone(),
            scaler,
        })
    }
}

impl FittedColumnTransform for FittedDateTransform {
    fn apply(&self, records: &[CleanedRecord]) -> Result<Array2<f64>, PreprocessingError> {
        self.scaler.transform(&date_matrix(records, &self.features))
    }

    fn feature_names(&self) -> Vec<String> {
        self.features
            .iter()
            .map(|f| format!("date_of_journey_{}", f.name()))
            .collect()
    }

    fn n_features_out(&self) -> usize {
        self.features.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::record_on;

    #[test]
    fn test_extract_components() {
        // 2019-05-21 was a Tuesday, day 141 of the year
        let date = NaiveDate::from_ymd_opt(2019, 5, 21).unwrap();
        assert_eq!(DateFeature::Month.extract(date), 5.0);
        assert_eq!(DateFeature::DayOfWeek.extract(date), 1.0);
        assert_eq!(DateFeature::DayOfYear.extract(date), 141.0);
    }

    #[test]
    fn test_scaled_to_training_range() {
        let records = vec![
            record_on(2019, 3, 1),
            record_on(2019, 6, 27),
            record_on(2019, 4, 15),
        ];
        let fitted = DateTransform::new().fit(&records, &[1.0, 2.0, 3.0]).unwrap();
        let out = fitted.apply(&records).unwrap();

        assert_eq!(out.dim(), (3, 3));
        // month: 3 -> 0, 6 -> 1
        assert!((out[[0, 0]] - 0.0).abs() < 1e-12);
        assert!((out[[1, 0]] - 1.0).abs() < 1e-12);
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(
            fitted.feature_names(),
            vec![
                "date_of_journey_month",
                "date_of_journey_day_of_week",
                "date_of_journey_day_of_year"
            ]
        );
    }

    #[test]
    fn test_out_of_range_dates_extrapolate() {
        let records = vec![record_on(2019, 3, 1), record_on(2019, 6, 1)];
        let fitted = DateTransform::new().fit(&records, &[1.0, 2.0]).unwrap();
        let out = fitted.apply(&[record_on(2019, 9, 1)]).unwrap();
        assert!((out[[0, 0]] - 2.0).abs() < 1e-12);
    }
}
