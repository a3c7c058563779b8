//! Rare-category grouping.
//!
//! For a variable with more than `n_categories` distinct values, categories
//! whose share of the training rows is below `tol` are replaced by
//! `replace_with`. Variables with few categories pass through unchanged.

use super::{ensure_fit_input, ensure_width};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rare label encoder (unfitted).
#[derive(Clone, Debug)]
pub struct RareLabelEncoder {
    tol: f64,
    n_categories: usize,
    replace_with: String,
}

impl Default for RareLabelEncoder {
    fn default() -> Self {
        Self {
            tol: 0.1,
            n_categories: 2,
            replace_with: "other".to_string(),
        }
    }
}

impl RareLabelEncoder {
    /// Create an encoder with `tol = 0.1`, `n_categories = 2`, `replace_with = "other"`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum share of rows a category needs to be kept.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Variables with at most this many distinct values are not grouped.
    pub fn with_n_categories(mut self, n_categories: usize) -> Self {
        self.n_categories = n_categories;
        self
    }

    /// Label substituted for rare categories.
    pub fn with_replace_with(mut self, label: impl Into<String>) -> Self {
        self.replace_with = label.into();
        self
    }
}

/// Fitted RareLabelEncoder ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedRareLabelEncoder {
    /// Sorted frequent categories per column; `None` if the column is not grouped.
    frequent_: Vec<Option<Vec<String>>>,
    replace_with: String,
}

impl FittedRareLabelEncoder {
    /// Frequent categories learned for each column (`None` = passthrough).
    pub fn frequent_categories(&self) -> &[Option<Vec<String>>] {
        &self.frequent_
    }

    /// The catch-all label.
    pub fn replace_with(&self) -> &str {
        &self.replace_with
    }
}

impl Transformer for RareLabelEncoder {
    type Input = Array2<String>;
    type Output = Array2<String>;
    type Fitted = FittedRareLabelEncoder;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if !(0.0..=1.0).contains(&self.tol) {
            return Err(PreprocessingError::InvalidParameter(format!(
                "tol must be within [0, 1], got {}",
                self.tol
            )));
        }
        ensure_fit_input(data, "RareLabelEncoder")?;

        let n_rows = data.nrows() as f64;
        let frequent_ = data
            .columns()
            .into_iter()
            .map(|column| {
                let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
                for value in column.iter() {
                    *counts.entry(value.as_str()).or_insert(0) += 1;
                }
                if counts.len() <= self.n_categories {
                    return None;
                }
                // BTreeMap iteration keeps the result sorted
                Some(
                    counts
                        .into_iter()
                        .filter(|&(_, count)| count as f64 / n_rows >= self.tol)
                        .map(|(category, _)| category.to_string())
                        .collect(),
                )
            })
            .collect();

        Ok(FittedRareLabelEncoder {
            frequent_,
            replace_with: self.replace_with.clone(),
        })
    }
}

impl FittedTransformer for FittedRareLabelEncoder {
    type Input = Array2<String>;
    type Output = Array2<String>;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        ensure_width(data, self.frequent_.len())?;

        Ok(Array2::from_shape_fn(data.raw_dim(), |(row, col)| {
            let value = &data[[row, col]];
            match &self.frequent_[col] {
                Some(frequent) if frequent.binary_search(value).is_err() => {
                    self.replace_with.clone()
                }
                _ => value.clone(),
            }
        }))
    }

    fn n_features_in(&self) -> usize {
        self.frequent_.len()
    }
}
