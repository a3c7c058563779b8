//! Airline: rare-label grouping followed by one-hot encoding.

use super::traits::{ensure_target, text_matrix, ColumnTransform, FittedColumnTransform};
use crate::preprocessing::{
    FittedOneHotEncoder, FittedRareLabelEncoder, FittedTransformer, HandleUnknown, OneHotEncoder,
    PreprocessingError, RareLabelEncoder, Transformer,
};
use crate::schema::{CleanedRecord, Column};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

fn airline_of(record: &CleanedRecord) -> &str {
    &record.airline
}

fn airline_matrix(records: &[CleanedRecord]) -> Array2<String> {
    text_matrix(records, &[airline_of])
}

#[derive(Clone, Debug)]
pub struct AirlineTransform {
    grouper: RareLabelEncoder,
    encoder: OneHotEncoder,
}

impl AirlineTransform {
    /// Unseen airlines encode as all zeros.
    pub fn new(grouper: RareLabelEncoder) -> Self {
        Self {
            grouper,
            encoder: OneHotEncoder::new().with_handle_unknown(HandleUnknown::Ignore),
        }
    }
}

impl Default for AirlineTransform {
    fn default() -> Self {
        Self::new(RareLabelEncoder::new())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedAirlineTransform {
    grouper: FittedRareLabelEncoder,
    encoder: FittedOneHotEncoder,
}

impl FittedAirlineTransform {
    /// Airline categories kept after grouping, in output column order.
    pub fn categories(&self) -> &[String] {
        self.encoder
            .categories()
            .first()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl ColumnTransform for AirlineTransform {
    type Fitted = FittedAirlineTransform;

    fn name(&self) -> &'static str {
        "airline"
    }

    fn input_columns(&self) -> &'static [Column] {
        &[Column::Airline]
    }

    fn fit(
        &self,
        records: &[CleanedRecord],
        target: &[f64],
    ) -> Result<Self::Fitted, PreprocessingError> {
        ensure_target(records, target)?;
        let airlines = airline_matrix(records);
        let grouper = self.grouper.fit(&airlines)?;
        let encoder = self.encoder.fit(&grouper.transform(&airlines)?)?;
        Ok(FittedAirlineTransform { grouper, encoder })
    }
}

impl FittedColumnTransform for FittedAirlineTransform {
    fn apply(&self, records: &[CleanedRecord]) -> Result<Array2<f64>, PreprocessingError> {
        let grouped = self.grouper.transform(&airline_matrix(records))?;
        self.encoder.transform(&grouped)
    }

    fn feature_names(&self) -> Vec<String> {
        self.encoder.feature_names(&["airline"])
    }

    fn n_features_out(&self) -> usize {
        self.encoder.n_features_out()
    }
}
