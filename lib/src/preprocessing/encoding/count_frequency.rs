//! Count / frequency encoding.

use super::{ensure_fit_input, ensure_width, HandleUnknown};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a category is replaced with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMethod {
    /// Number of training rows with the category.
    #[default]
    Count,
    /// Share of training rows with the category.
    Frequency,
}

/// Count/frequency encoder (unfitted).
#[derive(Clone, Debug)]
pub struct CountFrequencyEncoder {
    method: EncodingMethod,
    handle_unknown: HandleUnknown,
}

impl Default for CountFrequencyEncoder {
    fn default() -> Self {
        Self {
            method: EncodingMethod::Count,
            handle_unknown: HandleUnknown::Ignore,
        }
    }
}

impl CountFrequencyEncoder {
    /// Count encoding; unseen categories map to 0.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: EncodingMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = strategy;
        self
    }
}

/// Fitted CountFrequencyEncoder ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedCountFrequencyEncoder {
    encodings_: Vec<BTreeMap<String, f64>>,
    handle_unknown: HandleUnknown,
}

impl FittedCountFrequencyEncoder {
    pub fn encodings(&self) -> &[BTreeMap<String, f64>] {
        &self.encodings_
    }
}

impl Transformer for CountFrequencyEncoder {
    type Input = Array2<String>;
    type Output = Array2<f64>;
    type Fitted = FittedCountFrequencyEncoder;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        ensure_fit_input(data, "CountFrequencyEncoder")?;

        let n_rows = data.nrows() as f64;
        let encodings_ = data
            .columns()
            .into_iter()
            .map(|column| {
                let mut counts: BTreeMap<String, f64> = BTreeMap::new();
                for value in column.iter() {
                    *counts.entry(value.clone()).or_insert(0.0) += 1.0;
                }
                if self.method == EncodingMethod::Frequency {
                    counts.values_mut().for_each(|c| *c /= n_rows);
                }
                counts
            })
            .collect();

        Ok(FittedCountFrequencyEncoder {
            encodings_,
            handle_unknown: self.handle_unknown,
        })
    }
}

impl FittedTransformer for FittedCountFrequencyEncoder {
    type Input = Array2<String>;
    type Output = Array2<f64>;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        ensure_width(data, self.encodings_.len())?;

        let mut result = Array2::<f64>::zeros(data.raw_dim());
        for ((row, col), value) in data.indexed_iter() {
            match self.encodings_[col].get(value) {
                Some(&encoded) => result[[row, col]] = encoded,
                None if self.handle_unknown == HandleUnknown::Error => {
                    return Err(PreprocessingError::UnknownCategory {
                        column: col,
                        value: value.clone(),
                    });
                }
                None => {}
            }
        }
        Ok(result)
    }

    fn n_features_in(&self) -> usize {
        self.encodings_.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[&str]) -> Array2<String> {
        Array2::from_shape_fn((values.len(), 1), |(i, _)| values[i].to_string())
    }

    #[test]
    fn test_count_encoding() {
        let data = column(&["start", "mid", "mid", "end", "mid"]);
        let fitted = CountFrequencyEncoder::new().fit(&data).unwrap();
        let out = fitted.transform(&data).unwrap();

        assert_eq!(out.column(0).to_vec(), vec![1.0, 3.0, 3.0, 1.0, 3.0]);
    }

    #[test]
    fn test_frequency_encoding() {
        let data = column(&["a", "a", "a", "b"]);
        let fitted = CountFrequencyEncoder::new()
            .with_method(EncodingMethod::Frequency)
            .fit(&data)
            .unwrap();
        assert!((fitted.encodings()[0]["a"] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_is_zero_by_default() {
        let fitted = CountFrequencyEncoder::new()
            .fit(&column(&["a", "b"]))
            .unwrap();
        let out = fitted.transform(&column(&["z"])).unwrap();
        assert_eq!(out[[0, 0]], 0.0);
    }

    #[test]
    fn test_unknown_error() {
        let fitted = CountFrequencyEncoder::new()
            .with_handle_unknown(HandleUnknown::Error)
            .fit(&column(&["a"]))
            .unwrap();
        assert!(fitted.transform(&column(&["z"])).is_err());
    }
}
