//! Min-max scaling of bounded numeric features.
//!
//! Each column maps its training minimum to `min` and its training maximum to
//! `max` (default `[0, 1]`):
//! ```text
//! scaled = (x - col_min) * (max - min) / (col_max - col_min) + min
//! ```
//! A column that was constant during fit keeps a unit scale, so its training
//! value maps to `min`. Values outside the fit-time range extrapolate
//! linearly; nothing is clamped.
//!
//! ```ignore
//! use flight_fare::preprocessing::{FittedTransformer, MinMaxScaler, Transformer};
//!
//! // month, day_of_week, day_of_year
//! let fitted = MinMaxScaler::new().fit(&calendar_train)?;
//! let scaled = fitted.transform(&calendar_test)?;
//! ```

use super::{ensure_finite, ensure_width};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Configuration for MinMaxScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScalerConfig {
    /// Minimum value of the target range.
    pub min: f64,
    /// Maximum value of the target range.
    pub max: f64,
}

impl Default for MinMaxScalerConfig {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

/// MinMaxScaler transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct MinMaxScaler {
    config: MinMaxScalerConfig,
}

impl MinMaxScaler {
    /// Create a new MinMaxScaler with default range [0, 1].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target range for scaling. Validated at fit time.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.config.min = min;
        self.config.max = max;
        self
    }
}

impl Transformer for MinMaxScaler {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Fitted = FittedMinMaxScaler;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if !(self.config.max > self.config.min) {
            return Err(PreprocessingError::InvalidParameter(format!(
                "max must be greater than min, got [{}, {}]",
                self.config.min, self.config.max
            )));
        }
        if data.nrows() == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit MinMaxScaler on empty data".to_string(),
            ));
        }
        ensure_finite(data, "MinMaxScaler")?;

        let min_ = data.fold_axis(Axis(0), f64::INFINITY, |&acc, &x| acc.min(x));
        let max_ = data.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &x| acc.max(x));

        let target_range = self.config.max - self.config.min;
        let scale_ = Array1::from_iter(min_.iter().zip(max_.iter()).map(|(&min, &max)| {
            let range = max - min;
            if range == 0.0 {
                1.0
            } else {
                target_range / range
            }
        }));

        Ok(FittedMinMaxScaler {
            config: self.config.clone(),
            min_: min_.to_vec(),
            max_: max_.to_vec(),
            scale_: scale_.to_vec(),
        })
    }
}

/// Fitted MinMaxScaler ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedMinMaxScaler {
    config: MinMaxScalerConfig,
    min_: Vec<f64>,
    max_: Vec<f64>,
    scale_: Vec<f64>,
}

impl FittedMinMaxScaler {
    /// Get the minimum values for each feature.
    pub fn min(&self) -> &[f64] {
        &self.min_
    }

    /// Get the maximum values for each feature.
    pub fn max(&self) -> &[f64] {
        &self.max_
    }

    /// Get the scale factor for each feature.
    pub fn scale(&self) -> &[f64] {
        &self.scale_
    }
}

impl FittedTransformer for FittedMinMaxScaler {
    type Input = Array2<f64>;
    type Output = Array2<f64>;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        ensure_width(data, self.min_.len())?;

        let mut result = data.clone();
        for (col, mut column) in result.axis_iter_mut(Axis(1)).enumerate() {
            let (min, scale) = (self.min_[col], self.scale_[col]);
            column.mapv_inplace(|x| (x - min) * scale + self.config.min);
        }
        Ok(result)
    }

    fn n_features_in(&self) -> usize {
        self.min_.len()
    }
}
