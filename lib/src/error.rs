//! Crate-level error type.

use crate::preprocessing::PreprocessingError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by cleaning, training, persistence and prediction.
#[derive(Debug, Error)]
pub enum FareError {
    /// A field value could not be parsed into its typed form.
    #[error("cannot parse {column} value {value:?}: {reason}")]
    Parse {
        column: String,
        value: String,
        reason: String,
    },
    /// A column or query field is missing, extra, or has the wrong type.
    #[error("schema error: {0}")]
    Schema(String),
    /// An input file or model artifact does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// A value is outside its valid domain.
    #[error("invalid value: {0}")]
    Value(String),
    /// Fitting or training the regression estimator failed.
    #[error("model error: {0}")]
    Model(String),
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

impl FareError {
    /// Build a [`FareError::Parse`].
    pub fn parse(column: &str, value: &str, reason: impl Into<String>) -> Self {
        FareError::Parse {
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Build a [`FareError::Schema`].
    pub fn schema(msg: impl Into<String>) -> Self {
        FareError::Schema(msg.into())
    }

    /// Map an I/O error on `path` to `NotFound` when the file is absent.
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            FareError::NotFound(path.into())
        } else {
            FareError::Io(err)
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, FareError>;
