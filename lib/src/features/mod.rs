//! Feature engineering: six column-scoped transforms applied in a fixed order.
//!
//! | # | step | input | output |
//! |---|------|-------|--------|
//! | 1 | airline | airline | one-hot of rare-grouped airline |
//! | 2 | date | date_of_journey | month, day_of_week, day_of_year (min-max) |
//! | 3 | location | source, destination | Yeo-Johnson(mean-encoded city) x2, is_north x2 |
//! | 4 | time | dep_time, arrival_time | hour/minute x2 (min-max), part of day x2 |
//! | 5 | duration | duration_minute | ln(duration_minute) |
//! | 6 | stops | total_stops | is_direct_flight |
//!
//! Steps are fitted independently (in parallel) and their outputs are
//! concatenated horizontally by position, so the feature vector width and
//! column order are identical for fit and apply.

pub mod airline;
pub mod date;
pub mod duration;
pub mod location;
pub mod stops;
pub mod time;
pub mod traits;

pub use airline::{AirlineTransform, FittedAirlineTransform};
pub use date::{DateFeature, DateTransform, FittedDateTransform};
pub use duration::{DurationLogTransform, FittedDurationLogTransform};
pub use location::{is_north, FittedLocationTransform, LocationTransform, NORTH_CITIES};
pub use stops::{is_direct_flight, DirectFlightTransform, FittedDirectFlightTransform};
pub use time::{FittedTimeTransform, PartOfDay, PartOfDayBounds, TimeTransform};
pub use traits::{ColumnTransform, FittedColumnTransform};

use crate::config::FeatureConfig;
use crate::preprocessing::{MeanEncoder, PreprocessingError, RareLabelEncoder};
use crate::schema::{CleanedRecord, Column};
use ndarray::{concatenate, Array2, ArrayView2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Enum of unfitted feature steps.
#[derive(Clone, Debug)]
pub enum FeatureStep {
    Airline(AirlineTransform),
    Date(DateTransform),
    Location(LocationTransform),
    Time(TimeTransform),
    Duration(DurationLogTransform),
    Stops(DirectFlightTransform),
}

/// Enum of fitted feature steps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FittedFeatureStep {
    Airline(FittedAirlineTransform),
    Date(FittedDateTransform),
    Location(FittedLocationTransform),
    Time(FittedTimeTransform),
    Duration(FittedDurationLogTransform),
    Stops(FittedDirectFlightTransform),
}

impl FeatureStep {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureStep::Airline(t) => t.name(),
            FeatureStep::Date(t) => t.name(),
            FeatureStep::Location(t) => t.name(),
            FeatureStep::Time(t) => t.name(),
            FeatureStep::Duration(t) => t.name(),
            FeatureStep::Stops(t) => t.name(),
        }
    }

    pub fn input_columns(&self) -> &'static [Column] {
        match self {
            FeatureStep::Airline(t) => t.input_columns(),
            FeatureStep::Date(t) => t.input_columns(),
            FeatureStep::Location(t) => t.input_columns(),
            FeatureStep::Time(t) => t.input_columns(),
            FeatureStep::Duration(t) => t.input_columns(),
            FeatureStep::Stops(t) => t.input_columns(),
        }
    }

    fn fit(
        &self,
        records: &[CleanedRecord],
        target: &[f64],
    ) -> Result<(FittedFeatureStep, &'static [Column]), PreprocessingError> {
        let fitted = match self {
            FeatureStep::Airline(t) => t.fit(records, target).map(FittedFeatureStep::Airline),
            FeatureStep::Date(t) => t.fit(records, target).map(FittedFeatureStep::Date),
            FeatureStep::Location(t) => t.fit(records, target).map(FittedFeatureStep::Location),
            FeatureStep::Time(t) => t.fit(records, target).map(FittedFeatureStep::Time),
            FeatureStep::Duration(t) => t.fit(records, target).map(FittedFeatureStep::Duration),
            FeatureStep::Stops(t) => t.fit(records, target).map(FittedFeatureStep::Stops),
        }?;
        Ok((fitted, self.input_columns()))
    }
}

impl FittedFeatureStep {
    pub fn apply(&self, records: &[CleanedRecord]) -> Result<Array2<f64>, PreprocessingError> {
        match self {
            FittedFeatureStep::Airline(t) => t.apply(records),
            FittedFeatureStep::Date(t) => t.apply(records),
            FittedFeatureStep::Location(t) => t.apply(records),
            FittedFeatureStep::Time(t) => t.apply(records),
            FittedFeatureStep::Duration(t) => t.apply(records),
            FittedFeatureStep::Stops(t) => t.apply(records),
        }
    }

    pub fn feature_names(&self) -> Vec<String> {
        match self {
            FittedFeatureStep::Airline(t) => t.feature_names(),
            FittedFeatureStep::Date(t) => t.feature_names(),
            FittedFeatureStep::Location(t) => t.feature_names(),
            FittedFeatureStep::Time(t) => t.feature_names(),
            FittedFeatureStep::Duration(t) => t.feature_names(),
            FittedFeatureStep::Stops(t) => t.feature_names(),
        }
    }

    pub fn n_features_out(&self) -> usize {
        match self {
            FittedFeatureStep::Airline(t) => t.n_features_out(),
            FittedFeatureStep::Date(t) => t.n_features_out(),
            FittedFeatureStep::Location(t) => t.n_features_out(),
            FittedFeatureStep::Time(t) => t.n_features_out(),
            FittedFeatureStep::Duration(t) => t.n_features_out(),
            FittedFeatureStep::Stops(t) => t.n_features_out(),
        }
    }
}

/// Ordered collection of feature steps.
///
/// # Example
/// ```ignore
/// use flight_fare::config::FeatureConfig;
/// use flight_fare::features::FeatureTransformSet;
///
/// let set = FeatureTransformSet::from_config(&FeatureConfig::default());
/// let fitted = set.fit(&train, &train_prices)?;
/// let x_train = fitted.apply(&train)?;
/// let x_val = fitted.apply(&validation)?;
/// assert_eq!(x_train.ncols(), x_val.ncols());
/// ```
#[derive(Clone, Debug, Default)]
pub struct FeatureTransformSet {
    steps: Vec<FeatureStep>,
}

impl FeatureTransformSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The six standard steps, configured from `config`.
    pub fn from_config(config: &FeatureConfig) -> Self {
        let grouper = RareLabelEncoder::new()
            .with_tol(config.rare_tol)
            .with_n_categories(config.rare_n_categories)
            .with_replace_with(config.rare_replace_with.clone());
        let location = LocationTransform::new(
            grouper.clone(),
            MeanEncoder::new().with_smoothing(config.mean_smoothing),
        )
        .with_north_cities(config.north_cities.iter().cloned());

        Self::new()
            .add(FeatureStep::Airline(AirlineTransform::new(grouper)))
            .add(FeatureStep::Date(DateTransform::new()))
            .add(FeatureStep::Location(location))
            .add(FeatureStep::Time(TimeTransform::new(config.part_of_day)))
            .add(FeatureStep::Duration(DurationLogTransform))
            .add(FeatureStep::Stops(DirectFlightTransform))
    }

    /// Append a step; its output goes after every existing step's output.
    pub fn add(mut self, step: FeatureStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Fit every step on the training rows, in parallel.
    pub fn fit(
        &self,
        records: &[CleanedRecord],
        target: &[f64],
    ) -> Result<FittedFeatureTransformSet, PreprocessingError> {
        if self.steps.is_empty() {
            return Err(PreprocessingError::InvalidParameter(
                "Cannot fit an empty FeatureTransformSet".to_string(),
            ));
        }
        info!(rows = records.len(), steps = self.steps.len(), "fitting feature transforms");

        let fitted: Vec<(FittedFeatureStep, &'static [Column])> = self
            .steps
            .par_iter()
            .map(|step| step.fit(records, target))
            .collect::<Result<_, _>>()?;

        let mut steps = Vec::with_capacity(fitted.len());
        let mut required_columns = BTreeSet::new();
        for ((step, columns), unfitted) in fitted.into_iter().zip(&self.steps) {
            debug!(step = unfitted.name(), n_features_out = step.n_features_out(), "fitted feature step");
            required_columns.extend(columns.iter().copied());
            steps.push(step);
        }

        let feature_names: Vec<String> = steps.iter().flat_map(|s| s.feature_names()).collect();
        info!(n_features = feature_names.len(), "feature transforms fitted");
        Ok(FittedFeatureTransformSet {
            steps,
            feature_names,
            required_columns,
        })
    }
}

/// Fitted feature steps; immutable after fit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedFeatureTransformSet {
    steps: Vec<FittedFeatureStep>,
    feature_names: Vec<String>,
    required_columns: BTreeSet<Column>,
}

impl FittedFeatureTransformSet {
    /// Map rows to the feature matrix, `(records.len(), n_features_out())`.
    pub fn apply(&self, records: &[CleanedRecord]) -> Result<Array2<f64>, PreprocessingError> {
        if records.is_empty() {
            return Ok(Array2::zeros((0, self.n_features_out())));
        }

        let outputs = self
            .steps
            .iter()
            .map(|step| step.apply(records))
            .collect::<Result<Vec<_>, _>>()?;
        let views: Vec<ArrayView2<f64>> = outputs.iter().map(|o| o.view()).collect();

        let matrix = concatenate(Axis(1), &views).map_err(|e| PreprocessingError::InvalidShape {
            expected: format!("({}, {})", records.len(), self.n_features_out()),
            got: e.to_string(),
        })?;
        if matrix.ncols() != self.n_features_out() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.n_features_out(),
                got_features: matrix.ncols(),
            });
        }
        Ok(matrix)
    }

    /// Output column names, in order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features_out(&self) -> usize {
        self.feature_names.len()
    }

    /// Cleaned columns read by at least one step.
    pub fn required_columns(&self) -> &BTreeSet<Column> {
        &self.required_columns
    }

    pub fn steps(&self) -> &[FittedFeatureStep] {
        &self.steps
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::schema::CleanedRecord;
    use chrono::{NaiveDate, NaiveTime};

    pub fn base() -> CleanedRecord {
        CleanedRecord {
            airline: "Indigo".to_string(),
            date_of_journey: NaiveDate::from_ymd_opt(2019, 3, 24).unwrap(),
            source: "Banglore".to_string(),
            destination: "New Delhi".to_string(),
            dep_time: NaiveTime::from_hms_opt(22, 20, 0).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(1, 10, 0).unwrap(),
            duration_minute: 170,
            total_stops: 0,
            additional_info: "no info".to_string(),
            price: Some(3897.0),
        }
    }

    pub fn record(airline: &str, source: &str, destination: &str, total_stops: u32) -> CleanedRecord {
        CleanedRecord {
            airline: airline.to_string(),
            source: source.to_string(),
            destination: destination.to_string(),
            total_stops,
            ..base()
        }
    }

    pub fn record_on(year: i32, month: u32, day: u32) -> CleanedRecord {
        CleanedRecord {
            date_of_journey: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            ..base()
        }
    }

    pub fn record_at(dep: (u32, u32), arrival: (u32, u32)) -> CleanedRecord {
        CleanedRecord {
            dep_time: NaiveTime::from_hms_opt(dep.0, dep.1, 0).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(arrival.0, arrival.1, 0).unwrap(),
            ..base()
        }
    }

    pub fn record_lasting(duration_minute: u32) -> CleanedRecord {
        CleanedRecord {
            duration_minute,
            ..base()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::Cleaner;
    use crate::synthetic::SyntheticFlights;

    fn cleaned(n: usize, seed: u64) -> (Vec<CleanedRecord>, Vec<f64>) {
        let frame = SyntheticFlights::new(seed).frame(n).unwrap();
        let records = Cleaner::default().clean_records(frame).unwrap();
        let target = records.iter().map(|r| r.price.unwrap()).collect();
        (records, target)
    }

    #[test]
    fn test_fit_and_apply_have_same_width() {
        let (train, target) = cleaned(400, 1);
        let (validation, _) = cleaned(100, 2);

        let fitted = FeatureTransformSet::from_config(&FeatureConfig::default())
            .fit(&train, &target)
            .unwrap();

        let x_train = fitted.apply(&train).unwrap();
        let x_val = fitted.apply(&validation).unwrap();
        assert_eq!(x_train.ncols(), fitted.n_features_out());
        assert_eq!(x_val.ncols(), x_train.ncols());
        assert_eq!(x_val.nrows(), validation.len());
        assert!(x_val.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_feature_order() {
        let (train, target) = cleaned(300, 3);
        let fitted = FeatureTransformSet::from_config(&FeatureConfig::default())
            .fit(&train, &target)
            .unwrap();
        let names = fitted.feature_names();

        let airline_width = names.iter().take_while(|n| n.starts_with("airline_")).count();
        assert!(airline_width > 0);
        assert_eq!(
            &names[airline_width..],
            &[
                "date_of_journey_month",
                "date_of_journey_day_of_week",
                "date_of_journey_day_of_year",
                "source_pt",
                "destination_pt",
                "source_is_north",
                "destination_is_north",
                "dep_time_hour",
                "dep_time_minute",
                "arrival_time_hour",
                "arrival_time_minute",
                "dep_time_part_of_day",
                "arrival_time_part_of_day",
                "duration_minute_log",
                "is_direct_flight",
            ]
        );
        assert_eq!(fitted.steps().len(), 6);
        assert!(fitted.required_columns().contains(&Column::TotalStops));
        assert!(!fitted.required_columns().contains(&Column::AdditionalInfo));
    }

    #[test]
    fn test_apply_is_deterministic() {
        let (train, target) = cleaned(200, 4);
        let set = FeatureTransformSet::from_config(&FeatureConfig::default());
        let a = set.fit(&train, &target).unwrap();
        let b = set.fit(&train, &target).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.apply(&train).unwrap(), b.apply(&train).unwrap());
    }

    #[test]
    fn test_apply_on_zero_rows() {
        let (train, target) = cleaned(100, 5);
        let fitted = FeatureTransformSet::from_config(&FeatureConfig::default())
            .fit(&train, &target)
            .unwrap();
        let out = fitted.apply(&[]).unwrap();
        assert_eq!(out.dim(), (0, fitted.n_features_out()));
    }

    #[test]
    fn test_empty_set_cannot_fit() {
        let (train, target) = cleaned(10, 6);
        assert!(FeatureTransformSet::new().fit(&train, &target).is_err());
    }

    #[test]
    fn test_fitted_set_survives_save_load() {
        use crate::serialization::SerializableParams;

        let (train, target) = cleaned(150, 7);
        let fitted = FeatureTransformSet::from_config(&FeatureConfig::default())
            .fit(&train, &target)
            .unwrap();
        let bytes = fitted.to_bytes().unwrap();
        let restored = FittedFeatureTransformSet::from_bytes(&bytes).unwrap();
        assert_eq!(restored.apply(&train).unwrap(), fitted.apply(&train).unwrap());
    }
}
