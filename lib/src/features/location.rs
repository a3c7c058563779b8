//! Source/destination: rare-label grouping, target-mean encoding and a
//! Yeo-Johnson power transform per column, followed by one north-city flag
//! per column.
//!
//! Output order: `[source_pt, destination_pt, source_is_north, destination_is_north]`.

use super::traits::{ensure_target, text_matrix, ColumnTransform, FittedColumnTransform};
use crate::preprocessing::{
    FittedMeanEncoder, FittedPowerTransformer, FittedRareLabelEncoder, FittedTransformer,
    MeanEncoder, PowerTransformer, PreprocessingError, RareLabelEncoder, SupervisedTransformer,
    Transformer,
};
use crate::schema::{CleanedRecord, Column};
use ndarray::{concatenate, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default north cities.
pub const NORTH_CITIES: [&str; 4] = ["Delhi", "Kolkata", "Mumbai", "New Delhi"];

fn source_of(record: &CleanedRecord) -> &str {
    &record.source
}

fn destination_of(record: &CleanedRecord) -> &str {
    &record.destination
}

fn city_matrix(records: &[CleanedRecord]) -> Array2<String> {
    text_matrix(records, &[source_of, destination_of])
}

/// Whether `city` is one of `north_cities` (exact match).
pub fn is_north(city: &str, north_cities: &BTreeSet<String>) -> bool {
    north_cities.contains(city)
}

fn north_flags(cities: &Array2<String>, north_cities: &BTreeSet<String>) -> Array2<f64> {
    cities.map(|city| if is_north(city, north_cities) { 1.0 } else { 0.0 })
}

#[derive(Clone, Debug)]
pub struct LocationTransform {
    grouper: RareLabelEncoder,
    encoder: MeanEncoder,
    power: PowerTransformer,
    north_cities: BTreeSet<String>,
}

impl LocationTransform {
    pub fn new(grouper: RareLabelEncoder, encoder: MeanEncoder) -> Self {
        Self {
            grouper,
            encoder,
            power: PowerTransformer::new(),
            north_cities: NORTH_CITIES.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn with_north_cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.north_cities = cities.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for LocationTransform {
    fn default() -> Self {
        Self::new(RareLabelEncoder::new(), MeanEncoder::new())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedLocationTransform {
    grouper: FittedRareLabelEncoder,
    encoder: FittedMeanEncoder,
    power: FittedPowerTransformer,
    north_cities: BTreeSet<String>,
}

impl FittedLocationTransform {
    pub fn mean_encoder(&self) -> &FittedMeanEncoder {
        &self.encoder
    }

    pub fn power_transformer(&self) -> &FittedPowerTransformer {
        &self.power
    }
}

impl ColumnTransform for LocationTransform {
    type Fitted = FittedLocationTransform;

    fn name(&self) -> &'static str {
        "location"
    }

    fn input_columns(&self) -> &'static [Column] {
        &[Column::Source, Column::Destination]
    }

    fn fit(
        &self,
        records: &[CleanedRecord],
        target: &[f64],
    ) -> Result<Self::Fitted, PreprocessingError> {
        ensure_target(records, target)?;
        let cities = city_matrix(records);

        let grouper = self.grouper.fit(&cities)?;
        let grouped = grouper.transform(&cities)?;
        let encoder = self.encoder.fit(&grouped, target)?;
        let power = self.power.fit(&encoder.transform(&grouped)?)?;

        Ok(FittedLocationTransform {
            grouper,
            encoder,
            power,
            north_cities: self.north_cities.clone(),
        })
    }
}

impl FittedColumnTransform for FittedLocationTransform {
    fn apply(&self, records: &[CleanedRecord]) -> Result<Array2<f64>, PreprocessingError> {
        let cities = city_matrix(records);
        let encoded = self
            .power
            .transform(&self.encoder.transform(&self.grouper.transform(&cities)?)?)?;
        let north = north_flags(&cities, &self.north_cities);

        concatenate(Axis(1), &[encoded.view(), north.view()]).map_err(|e| {
            PreprocessingError::InvalidShape {
                expected: format!("({}, 4)", records.len()),
                got: e.to_string(),
            }
        })
    }

    fn feature_names(&self) -> Vec<String> {
        ["source_pt", "destination_pt", "source_is_north", "destination_is_north"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn n_features_out(&self) -> usize {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::record;

    fn north() -> BTreeSet<String> {
        NORTH_CITIES.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_is_north() {
        assert!(is_north("Delhi", &north()));
        assert!(is_north("New Delhi", &north()));
        assert!(!is_north("Cochin", &north()));
        assert!(!is_north("delhi", &north()));
    }

    #[test]
    fn test_output_layout() {
        let records = vec![
            record("Indigo", "Delhi", "Cochin", 1),
            record("Indigo", "Banglore", "New Delhi", 0),
            record("Indigo", "Kolkata", "Banglore", 1),
            record("Indigo", "Chennai", "Kolkata", 0),
            record("Indigo", "Mumbai", "Hyderabad", 0),
        ];
        let target = [9000.0, 5000.0, 8000.0, 4000.0, 3500.0];

        let fitted = LocationTransform::default().fit(&records, &target).unwrap();
        let out = fitted.apply(&records).unwrap();

        assert_eq!(out.dim(), (5, 4));
        assert_eq!(fitted.n_features_out(), 4);
        // Flags come after the power-transformed columns
        assert_eq!(out.column(2).to_vec(), vec![1.0, 0.0, 1.0, 0.0, 1.0]);
        assert_eq!(out.column(3).to_vec(), vec![0.0, 1.0, 0.0, 1.0, 0.0]);
        // Standardized training output
        let mean = out.column(0).sum() / 5.0;
        assert!(mean.abs() < 1e-9);
    }

    #[test]
    fn test_unseen_city_uses_global_mean() {
        let records = vec![
            record("Indigo", "Delhi", "Cochin", 1),
            record("Indigo", "Banglore", "Delhi", 0),
            record("Indigo", "Kolkata", "Banglore", 1),
        ];
        let target = [9000.0, 5000.0, 8000.0];
        let fitted = LocationTransform::default().fit(&records, &target).unwrap();

        let out = fitted
            .apply(&[record("Indigo", "Goa", "Delhi", 0)])
            .unwrap();
        assert!(out.iter().all(|v| v.is_finite()));
        assert_eq!(out[[0, 2]], 0.0);
        assert_eq!(out[[0, 3]], 1.0);
    }

    #[test]
    fn test_custom_north_cities() {
        let records = vec![
            record("Indigo", "Delhi", "Cochin", 1),
            record("Indigo", "Cochin", "Delhi", 0),
        ];
        let fitted = LocationTransform::default()
            .with_north_cities(["Cochin"])
            .fit(&records, &[1.0, 2.0])
            .unwrap();
        let out = fitted.apply(&records).unwrap();
        assert_eq!(out.row(0).to_vec()[2..], [0.0, 1.0]);
    }
}
