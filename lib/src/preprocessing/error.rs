//! Error types for preprocessing operations.

use thiserror::Error;

/// Error type for preprocessing operations.
#[derive(Debug, Error)]
pub enum PreprocessingError {
    /// Shape mismatch between expected and actual matrix dimensions.
    #[error("Invalid shape: expected {expected}, got {got}")]
    InvalidShape { expected: String, got: String },
    /// Invalid hyperparameter value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(String),
    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),
    /// Feature dimension mismatch.
    #[error("Feature mismatch: expected {expected_features} features, got {got_features}")]
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    /// A category never seen during fit, with `HandleUnknown::Error`.
    #[error("Unknown category {value:?} in column {column}")]
    UnknownCategory { column: usize, value: String },
    /// A computation produced (or was fed) NaN or an infinity.
    #[error("Non-finite value in {feature} at row {row}: {value}")]
    NonFinite {
        feature: String,
        row: usize,
        value: f64,
    },
    /// Target length differs from the number of rows.
    #[error("Target mismatch: {rows} rows but {targets} target values")]
    TargetMismatch { rows: usize, targets: usize },
}

impl From<std::io::Error> for PreprocessingError {
    fn from(err: std::io::Error) -> Self {
        PreprocessingError::Io(err.to_string())
    }
}

impl From<bincode::Error> for PreprocessingError {
    fn from(err: bincode::Error) -> Self {
        PreprocessingError::Serialization(err.to_string())
    }
}
