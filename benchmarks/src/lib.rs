//! Benchmark utilities for flight-fare.
//!
//! - Fixture generation: cleaned synthetic records and a fitted pipeline
//! - Timing and latency statistics

pub mod utils;

pub use utils::{benchmark_with_warmup, time_fn, BenchmarkStats, Timer};

use flight_fare::cleaning::Cleaner;
use flight_fare::config::FeatureConfig;
use flight_fare::features::{FeatureTransformSet, FittedFeatureTransformSet};
use flight_fare::model::{ForestConfig, RandomForestRegressor, Regressor};
use flight_fare::schema::CleanedRecord;
use flight_fare::synthetic::SyntheticFlights;
use flight_fare::{ModelArtifact, Result};

/// Cleaned synthetic records and their prices.
pub fn cleaned_records(n: usize, seed: u64) -> Result<(Vec<CleanedRecord>, Vec<f64>)> {
    let frame = SyntheticFlights::new(seed).frame(n)?;
    let records = Cleaner::default().clean_records(frame)?;
    let prices = records.iter().filter_map(|r| r.price).collect();
    Ok((records, prices))
}

/// Fitted feature transforms over `records`.
pub fn fitted_features(records: &[CleanedRecord], prices: &[f64]) -> Result<FittedFeatureTransformSet> {
    Ok(FeatureTransformSet::from_config(&FeatureConfig::default()).fit(records, prices)?)
}

/// A complete artifact trained on `n` synthetic rows with `n_trees` trees.
pub fn trained_artifact(n: usize, n_trees: usize) -> Result<ModelArtifact> {
    let (records, prices) = cleaned_records(n, 42)?;
    let features = fitted_features(&records, &prices)?;
    let x = features.apply(&records)?;
    let forest = RandomForestRegressor::new(ForestConfig {
        n_trees,
        ..ForestConfig::default()
    })
    .fit(x.view(), &prices)?;
    ModelArtifact::new(features, forest, records.len())
}
