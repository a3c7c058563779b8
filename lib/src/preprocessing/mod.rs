//! Reusable preprocessing transformers.
//!
//! Every transformer comes as an unfitted configuration and a fitted,
//! serializable counterpart.
//!
//! # Design Philosophy
//!
//! - **Type Safety**: fitting returns a distinct `Fitted*` type; only fitted
//!   transformers can transform
//! - **Serializable**: fitted transformers are plain data and can be saved and loaded
//! - **sklearn-compatible**: API familiar to users of scikit-learn / feature-engine
//!
//! # Core Traits
//!
//! - [`Transformer`]: Unfitted transformer with hyperparameters
//! - [`SupervisedTransformer`]: Unfitted transformer that also learns from the target
//! - [`FittedTransformer`]: Fitted transformer ready for inference
//!
//! # Available Transformers
//!
//! ## Encoding
//! - [`RareLabelEncoder`]: Group infrequent categories into a catch-all label
//! - [`OneHotEncoder`]: One binary column per category
//! - [`MeanEncoder`]: Category -> mean training target
//! - [`CountFrequencyEncoder`]: Category -> training count or share
//!
//! ## Scaling
//! - [`MinMaxScaler`]: Scale to [0, 1] or custom range
//! - [`PowerTransformer`]: Yeo-Johnson power transform with standardization
//!
//! # Example
//!
//! ```ignore
//! use flight_fare::preprocessing::{FittedTransformer, MinMaxScaler, Transformer};
//!
//! let fitted = MinMaxScaler::new().fit(&training_data)?;
//! let scaled_train = fitted.transform(&training_data)?;
//! let scaled_test = fitted.transform(&test_data)?;
//! ```

pub mod encoding;
pub mod error;
pub mod scaling;
pub mod traits;

pub use encoding::{
    CountFrequencyEncoder, EncodingMethod, FittedCountFrequencyEncoder, FittedMeanEncoder,
    FittedOneHotEncoder, FittedRareLabelEncoder, HandleUnknown, MeanEncoder, OneHotEncoder,
    RareLabelEncoder,
};
pub use error::PreprocessingError;
pub use scaling::{
    yeo_johnson, FittedMinMaxScaler, FittedPowerTransformer, MinMaxScaler, MinMaxScalerConfig,
    PowerTransformer,
};
pub use traits::{FittedTransformer, SupervisedTransformer, Transformer};
