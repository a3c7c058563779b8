//! Core traits for preprocessing transformers.
//!
//! This module defines the central traits:
//! - [`Transformer`]: Used during fitting; has hyperparameters and learns from data.
//! - [`SupervisedTransformer`]: Like [`Transformer`], but fitting also sees the target.
//! - [`FittedTransformer`]: After fitting; ready for inference and serialization.
//!
//! Fitted transformers hold only plain data, so the fitted struct is itself the
//! serializable parameter set.

use crate::preprocessing::error::PreprocessingError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Trait for unfitted transformers with hyperparameters.
///
/// # Example
/// ```ignore
/// use flight_fare::preprocessing::{MinMaxScaler, Transformer, FittedTransformer};
///
/// let fitted = MinMaxScaler::new().fit(&train)?;
/// let scaled = fitted.transform(&validation)?;
/// ```
pub trait Transformer: Clone {
    /// Input data type for transformation.
    type Input;
    /// Output data type after transformation.
    type Output;
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer<Input = Self::Input, Output = Self::Output>;

    /// Fit the transformer to the training data.
    ///
    /// # Errors
    /// Returns [`PreprocessingError`] if the data is empty, contains invalid
    /// values, or the hyperparameters are out of range.
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError>;

    /// Fit the transformer and transform the same data in one step.
    fn fit_transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        let fitted = self.fit(data)?;
        fitted.transform(data)
    }
}

/// Trait for transformers whose fit depends on the regression target
/// (e.g. target-mean encoding).
pub trait SupervisedTransformer: Clone {
    /// Input data type for transformation.
    type Input;
    /// Output data type after transformation.
    type Output;
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer<Input = Self::Input, Output = Self::Output>;

    /// Fit the transformer to the training data and its target.
    ///
    /// # Errors
    /// Returns [`PreprocessingError::TargetMismatch`] when `target` does not
    /// have one value per row.
    fn fit(&self, data: &Self::Input, target: &[f64]) -> Result<Self::Fitted, PreprocessingError>;

    /// Fit and transform the training data in one step.
    fn fit_transform(
        &self,
        data: &Self::Input,
        target: &[f64],
    ) -> Result<Self::Output, PreprocessingError> {
        let fitted = self.fit(data, target)?;
        fitted.transform(data)
    }
}

/// Trait for fitted transformers ready for inference.
///
/// # Guarantees
/// - `transform` is a pure function of the fitted state and its input.
/// - The fitted state is plain serde data; it is persisted as part of the
///   model artifact.
pub trait FittedTransformer: Clone + Serialize + DeserializeOwned {
    /// Input data type for transformation.
    type Input;
    /// Output data type after transformation.
    type Output;

    /// Transform data using learned parameters.
    ///
    /// # Errors
    /// Returns [`PreprocessingError`] if the input width doesn't match the
    /// width seen during fit, or the input contains invalid values.
    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError>;

    /// Returns the number of features seen during fit.
    fn n_features_in(&self) -> usize;
}
