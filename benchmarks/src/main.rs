//! Stage timings for the flight-fare pipeline, printed as JSON.
//!
//! For statistically sound measurements use the criterion benches:
//!   cargo bench --package benchmarks --bench feature_pipeline
//!   cargo bench --package benchmarks --bench predict

use benchmarks::{benchmark_with_warmup, cleaned_records, fitted_features, time_fn, Timer};
use flight_fare::model::{ForestConfig, RandomForestRegressor, Regressor};
use flight_fare::{ModelArtifact, PredictionQuery, Predictor};
use serde::Serialize;
use std::error::Error;

#[derive(Serialize)]
struct StageReport {
    rows: usize,
    clean_ms: f64,
    fit_features_ms: f64,
    apply_features_ms: f64,
    fit_forest_ms: f64,
    predict_single: Option<benchmarks::BenchmarkStats>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut reports = Vec::new();

    for rows in [1_000, 5_000, 10_000] {
        let (cleaned, clean) = time_fn(|| cleaned_records(rows, 42));
        let (records, prices) = cleaned?;

        let mut timer = Timer::new();
        timer.start();
        let features = fitted_features(&records, &prices)?;
        let fit_features = timer.stop();

        let (x, apply) = time_fn(|| features.apply(&records));
        let x = x?;

        let (forest, fit_forest) = time_fn(|| {
            RandomForestRegressor::new(ForestConfig::default()).fit(x.view(), &prices)
        });
        let artifact = ModelArtifact::new(features, forest?, records.len())?;

        let predictor = Predictor::new(artifact);
        let query = PredictionQuery::sample();
        let predict_single = benchmark_with_warmup(10, 200, || predictor.predict(&query));

        reports.push(StageReport {
            rows,
            clean_ms: clean.as_secs_f64() * 1000.0,
            fit_features_ms: fit_features.as_secs_f64() * 1000.0,
            apply_features_ms: apply.as_secs_f64() * 1000.0,
            fit_forest_ms: fit_forest.as_secs_f64() * 1000.0,
            predict_single,
        });
    }

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
