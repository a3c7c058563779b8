//! Target-mean encoding.
//!
//! Each category is replaced by the mean target value of its training rows,
//! optionally shrunk towards the global mean:
//! ```text
//! encoding = (sum_y + m * global_mean) / (count + m)
//! ```
//! With `m = 0` (the default) this is the plain per-category mean.

use super::{ensure_fit_input, ensure_width, HandleUnknown};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, SupervisedTransformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean encoder (unfitted).
#[derive(Clone, Debug)]
pub struct MeanEncoder {
    smoothing: f64,
    handle_unknown: HandleUnknown,
}

impl Default for MeanEncoder {
    fn default() -> Self {
        Self {
            smoothing: 0.0,
            handle_unknown: HandleUnknown::Ignore,
        }
    }
}

impl MeanEncoder {
    /// Plain mean encoding; unseen categories map to the global mean.
    pub fn new() -> Self {
        Self::default()
    }

    /// M-estimate smoothing weight (`m >= 0`).
    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Set the strategy for handling unknown categories.
    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = strategy;
        self
    }
}

/// Fitted MeanEncoder ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedMeanEncoder {
    encodings_: Vec<BTreeMap<String, f64>>,
    global_mean_: f64,
    handle_unknown: HandleUnknown,
}

impl FittedMeanEncoder {
    /// Learned category -> value table for each column.
    pub fn encodings(&self) -> &[BTreeMap<String, f64>] {
        &self.encodings_
    }

    /// Mean of the training target.
    pub fn global_mean(&self) -> f64 {
        self.global_mean_
    }
}

impl SupervisedTransformer for MeanEncoder {
    type Input = Array2<String>;
    type Output = Array2<f64>;
    type Fitted = FittedMeanEncoder;

    fn fit(&self, data: &Self::Input, target: &[f64]) -> Result<Self::Fitted, PreprocessingError> {
        if !(self.smoothing >= 0.0 && self.smoothing.is_finite()) {
            return Err(PreprocessingError::InvalidParameter(format!(
                "smoothing must be a non-negative number, got {}",
                self.smoothing
            )));
        }
        ensure_fit_input(data, "MeanEncoder")?;
        if target.len() != data.nrows() {
            return Err(PreprocessingError::TargetMismatch {
                rows: data.nrows(),
                targets: target.len(),
            });
        }
        if let Some((row, &value)) = target.iter().enumerate().find(|(_, y)| !y.is_finite()) {
            return Err(PreprocessingError::NonFinite {
                feature: "target".to_string(),
                row,
                value,
            });
        }

        let global_mean_ = target.iter().sum::<f64>() / target.len() as f64;
        let m = self.smoothing;

        let encodings_ = data
            .columns()
            .into_iter()
            .map(|column| {
                let mut stats: BTreeMap<String, (f64, usize)> = BTreeMap::new();
                for (value, &y) in column.iter().zip(target) {
                    let entry = stats.entry(value.clone()).or_insert((0.0, 0));
                    entry.0 += y;
                    entry.1 += 1;
                }
                stats
                    .into_iter()
                    .map(|(category, (sum, count))| {
                        (category, (sum + m * global_mean_) / (count as f64 + m))
                    })
                    .collect()
            })
            .collect();

        Ok(FittedMeanEncoder {
            encodings_,
            global_mean_,
            handle_unknown: self.handle_unknown,
        })
    }
}

impl FittedTransformer for FittedMeanEncoder {
    type Input = Array2<String>;
    type Output = Array2<f64>;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        ensure_width(data, self.encodings_.len())?;

        let mut result = Array2::<f64>::zeros(data.raw_dim());
        for ((row, col), value) in data.indexed_iter() {
            result[[row, col]] = match self.encodings_[col].get(value) {
                Some(&encoded) => encoded,
                None if self.handle_unknown == HandleUnknown::Ignore => self.global_mean_,
                None => {
                    return Err(PreprocessingError::UnknownCategory {
                        column: col,
                        value: value.clone(),
                    })
                }
            };
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
    fn test_plain_mean_per_category() {
        let data = column(&["a", "a", "b", "b"]);
        let target = [1.0, 3.0, 10.0, 20.0];

        let fitted = MeanEncoder::new().fit(&data, &target).unwrap();
        let out = fitted.transform(&data).unwrap();

        assert!((out[[0, 0]] - 2.0).abs() < 1e-12);
        assert!((out[[2, 0]] - 15.0).abs() < 1e-12);
        assert!((fitted.global_mean() - 8.5).abs() < 1e-12);
    }

    #[test]
    fn test_smoothing_shrinks_towards_global_mean() {
        let data = column(&["a", "b", "b", "b"]);
        let target = [0.0, 4.0, 4.0, 4.0];

        let fitted = MeanEncoder::new()
            .with_smoothing(1.0)
            .fit(&data, &target)
            .unwrap();
        // global mean 3.0; a: (0 + 3) / 2 = 1.5
        let a = fitted.encodings()[0]["a"];
        assert!((a - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_maps_to_global_mean() {
        let fitted = MeanEncoder::new()
            .fit(&column(&["a", "b"]), &[2.0, 4.0])
            .unwrap();
        let out = fitted.transform(&column(&["Goa"])).unwrap();
        assert!((out[[0, 0]] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_errors_when_requested() {
        let fitted = MeanEncoder::new()
            .with_handle_unknown(HandleUnknown::Error)
            .fit(&column(&["a", "b"]), &[2.0, 4.0])
            .unwrap();
        assert!(fitted.transform(&column(&["Goa"])).is_err());
    }

    #[test]
    fn test_target_length_mismatch() {
        let result = MeanEncoder::new().fit(&column(&["a", "b"]), &[1.0]);
        assert!(matches!(
            result,
            Err(PreprocessingError::TargetMismatch {
                rows: 2,
                targets: 1
            })
        ));
    }

    #[test]
    fn test_fit_transform_two_columns() {
        let data = Array2::from_shape_fn((3, 2), |(i, j)| {
            [["Delhi", "Cochin"], ["Delhi", "Banglore"], ["Mumbai", "Cochin"]][i][j].to_string()
        });
        let out = MeanEncoder::new()
            .fit_transform(&data, &[10.0, 20.0, 30.0])
            .unwrap();
        assert!((out[[0, 0]] - 15.0).abs() < 1e-12);
        assert!((out[[0, 1]] - 20.0).abs() < 1e-12);
        assert!((out[[1, 1]] - 20.0).abs() < 1e-12);
    }
}
