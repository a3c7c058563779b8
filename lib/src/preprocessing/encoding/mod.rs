//! Categorical feature encoding transformers.
//!
//! Encoders consume string categories as an `Array2<String>` (one column per
//! categorical variable) and either regroup them ([`RareLabelEncoder`]) or map
//! them to numbers.
//!
//! # Available Encoders
//!
//! ## RareLabelEncoder
//! Groups infrequent categories into a catch-all label.
//!
//! ## OneHotEncoder
//! Converts categories to one-hot (dummy) encoding.
//!
//! ```ignore
//! // Input: [["Indigo"], ["Air India"], ["Indigo"]]
//! // Output: [[0,1], [1,0], [0,1]]  (categories sorted: Air India, Indigo)
//! ```
//!
//! ## MeanEncoder
//! Replaces each category with the mean training target of its rows.
//!
//! ## CountFrequencyEncoder
//! Replaces each category with how often it occurred during fit.

mod count_frequency;
mod mean;
mod one_hot;
mod rare_label;

pub use count_frequency::{CountFrequencyEncoder, EncodingMethod, FittedCountFrequencyEncoder};
pub use mean::{FittedMeanEncoder, MeanEncoder};
pub use one_hot::{FittedOneHotEncoder, OneHotEncoder};
pub use rare_label::{FittedRareLabelEncoder, RareLabelEncoder};

use crate::preprocessing::error::PreprocessingError;
use ndarray::Array2;

/// Strategy for handling unknown categories during transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Raise an error when unknown categories are encountered.
    #[default]
    Error,
    /// Ignore unknown categories (zeros for one-hot and counts, the global
    /// mean for target encoding).
    Ignore,
}

fn ensure_fit_input(data: &Array2<String>, name: &str) -> Result<(), PreprocessingError> {
    if data.nrows() == 0 || data.ncols() == 0 {
        return Err(PreprocessingError::EmptyData(format!(
            "Cannot fit {} on empty data",
            name
        )));
    }
    Ok(())
}

fn ensure_width(data: &Array2<String>, expected: usize) -> Result<(), PreprocessingError> {
    if data.ncols() != expected {
        return Err(PreprocessingError::FeatureMismatch {
            expected_features: expected,
            got_features: data.ncols(),
        });
    }
    Ok(())
}
