//! Scaling transformers for numeric features.
//!
//! # Available Transformers
//!
//! | Transformer | Description | Use Case |
//! |-------------|-------------|----------|
//! | [`MinMaxScaler`] | Scale to [0, 1] or custom range | Bounded calendar/clock features |
//! | [`PowerTransformer`] | Yeo-Johnson + standardization | Skewed target-encoded features |
//!
//! # Example
//!
//! ```ignore
//! use flight_fare::preprocessing::scaling::MinMaxScaler;
//! use flight_fare::preprocessing::{FittedTransformer, Transformer};
//!
//! let fitted = MinMaxScaler::new().fit(&data)?;
//! let scaled = fitted.transform(&new_data)?;
//! ```

pub mod minmax;
pub mod power;

pub use minmax::{FittedMinMaxScaler, MinMaxScaler, MinMaxScalerConfig};
pub use power::{yeo_johnson, FittedPowerTransformer, PowerTransformer};

use crate::preprocessing::error::PreprocessingError;
use ndarray::Array2;

fn ensure_finite(data: &Array2<f64>, name: &str) -> Result<(), PreprocessingError> {
    if let Some(((row, col), &value)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(PreprocessingError::NonFinite {
            feature: format!("{} input column {}", name, col),
            row,
            value,
        });
    }
    Ok(())
}

fn ensure_width(data: &Array2<f64>, expected: usize) -> Result<(), PreprocessingError> {
    if data.ncols() != expected {
        return Err(PreprocessingError::FeatureMismatch {
            expected_features: expected,
            got_features: data.ncols(),
        });
    }
    Ok(())
}
