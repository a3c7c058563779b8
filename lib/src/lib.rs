//! # flight-fare
//!
//! A tabular regression pipeline for flight prices: raw listings are
//! cleaned into a typed schema, turned into a fixed-width feature matrix by
//! column-scoped fit/apply transforms, and fed to a random forest. The
//! fitted transforms and the forest are saved together as one artifact and
//! reused unchanged for single-row predictions.
//!
//! ## Core Design Principles
//!
//! - **Fit/Apply Separation**: every transform has an unfitted configuration
//!   and a fitted, immutable, serializable counterpart. Inference never refits.
//! - **Declared Schema**: raw columns are validated once at the cleaner
//!   boundary; transforms consume typed [`schema::CleanedRecord`]s.
//! - **Explicit Errors**: every stage returns [`Result`]; cleaning failures
//!   are either propagated or reported per step, never silently swallowed.
//! - **Deterministic Parallelism**: transforms and trees are fitted on the
//!   rayon pool, seeded and ordered so runs are reproducible.
//!
//! ## Quick Start
//!
//! ```ignore
//! use flight_fare::config::PipelineConfig;
//! use flight_fare::predictor::{PredictionQuery, Predictor};
//! use flight_fare::training::train;
//!
//! let config = PipelineConfig::from_file("flight_fare.toml")?;
//! let report = train(&config)?;
//! println!("{}", report.evaluation("test").unwrap());
//!
//! let predictor = Predictor::load(&config.data.model_path)?;
//! let price = predictor.predict(&PredictionQuery::sample())?;
//! ```
//!
//! ## Module Structure
//!
//! - `frame` / `schema`: columnar raw data and the cleaned record type
//! - `cleaning`: the ordered cleaning steps and field parsers
//! - `preprocessing`: reusable encoders and scalers
//! - `features`: the six column transforms and their ordered set
//! - `model`: CART trees and the random forest
//! - `dataset`: CSV I/O and seeded splits
//! - `artifact` / `predictor` / `training`: persistence, inference, training
//! - `config`: TOML configuration

pub mod artifact;
pub mod cleaning;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod frame;
pub mod metrics;
pub mod model;
pub mod predictor;
pub mod preprocessing;
pub mod schema;
pub mod serialization;
pub mod synthetic;
pub mod training;

pub use artifact::ModelArtifact;
pub use config::PipelineConfig;
pub use error::{FareError, Result};
pub use predictor::{predict_from_path, PredictionQuery, Predictor};
pub use training::{train, train_from_frame, TrainingReport};
