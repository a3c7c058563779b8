//! One-hot encoding for categorical features.

use super::{ensure_fit_input, ensure_width, HandleUnknown};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder for categorical features.
///
/// Each input column is treated as a categorical variable; the encoder learns
/// its distinct values during fitting and emits one binary column per value,
/// in sorted category order.
///
/// # Example
/// ```ignore
/// use flight_fare::preprocessing::{OneHotEncoder, HandleUnknown, Transformer};
///
/// let encoder = OneHotEncoder::new().with_handle_unknown(HandleUnknown::Ignore);
/// let fitted = encoder.fit(&airlines)?;
/// let encoded = fitted.transform(&airlines)?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct OneHotEncoder {
    /// How to handle unknown categories during transform.
    handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    /// Create a new OneHotEncoder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy for handling unknown categories.
    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = strategy;
        self
    }
}

/// Fitted OneHotEncoder ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedOneHotEncoder {
    /// Categories (unique sorted values) for each input column.
    categories_: Vec<Vec<String>>,
    /// Total number of output features.
    n_features_out: usize,
    handle_unknown: HandleUnknown,
}

impl FittedOneHotEncoder {
    /// Get the categories learned for each feature.
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories_
    }

    /// Get the number of output features.
    pub fn n_features_out(&self) -> usize {
        self.n_features_out
    }

    /// Output column names, `<input>_<category>`.
    pub fn feature_names(&self, input_names: &[&str]) -> Vec<String> {
        self.categories_
            .iter()
            .enumerate()
            .flat_map(|(col, cats)| {
                let prefix = input_names
                    .get(col)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("x{}", col));
                cats.iter().map(move |c| format!("{}_{}", prefix, c))
            })
            .collect()
    }
}

impl Transformer for OneHotEncoder {
    type Input = Array2<String>;
    type Output = Array2<f64>;
    type Fitted = FittedOneHotEncoder;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        ensure_fit_input(data, "OneHotEncoder")?;

        let categories_: Vec<Vec<String>> = data
            .columns()
            .into_iter()
            .map(|column| {
                column
                    .iter()
                    .cloned()
                    .collect::<BTreeSet<String>>()
                    .into_iter()
                    .collect()
            })
            .collect();
        let n_features_out = categories_.iter().map(Vec::len).sum();

        Ok(FittedOneHotEncoder {
            categories_,
            n_features_out,
            handle_unknown: self.handle_unknown,
        })
    }
}

impl FittedTransformer for FittedOneHotEncoder {
    type Input = Array2<String>;
    type Output = Array2<f64>;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        ensure_width(data, self.categories_.len())?;

        let mut result = Array2::<f64>::zeros((data.nrows(), self.n_features_out));
        for (row, values) in data.rows().into_iter().enumerate() {
            let mut offset = 0;
            for (col, value) in values.iter().enumerate() {
                let cats = &self.categories_[col];
                match cats.binary_search(value) {
                    Ok(idx) => result[[row, offset + idx]] = 1.0,
                    Err(_) if self.handle_unknown == HandleUnknown::Error => {
                        return Err(PreprocessingError::UnknownCategory {
                            column: col,
                            value: value.clone(),
                        });
                    }
                    // With Ignore, leave as zeros
                    Err(_) => {}
                }
                offset += cats.len();
            }
        }
        Ok(result)
    }

    fn n_features_in(&self) -> usize {
        self.categories_.len()
    }
}
