//! End-to-end flight fare pipeline on synthetic listings.
//!
//! This example walks through the whole workflow:
//! - Generating raw, slightly dirty listings
//! - Cleaning them with per-step reports
//! - Training the feature transforms and the random forest
//! - Saving the artifact and predicting single queries from it
//!
//! Run with: cargo run --example flight_fare_pipeline

use flight_fare::config::PipelineConfig;
use flight_fare::model::ForestConfig;
use flight_fare::predictor::{PredictionQuery, Predictor, QueryValue};
use flight_fare::synthetic::SyntheticFlights;
use flight_fare::training::train_from_frame;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== Flight Fare Pipeline ===\n");

    // 1. Raw listings
    let frame = SyntheticFlights::new(42).frame(3000)?;
    println!("Generated {} raw rows with columns {:?}\n", frame.n_rows(), frame.column_names());

    // 2. Clean, split, fit, evaluate
    let config = PipelineConfig {
        model: ForestConfig {
            n_trees: 50,
            ..ForestConfig::default()
        },
        ..PipelineConfig::default()
    };
    let report = train_from_frame(frame, &config)?;

    println!("Cleaning:");
    for step in &report.cleaning {
        println!(
            "  {:<26} {:>5} -> {:>5} rows{}",
            step.step.to_string(),
            step.rows_before,
            step.rows_after,
            step.error
                .as_deref()
                .map(|e| format!("  (skipped: {})", e))
                .unwrap_or_default()
        );
    }

    println!("\nEvaluation:");
    for evaluation in &report.evaluations {
        println!("  {:<10} {}", evaluation.split, evaluation.metrics);
    }

    let artifact = &report.artifact;
    println!("\nTop features:");
    for (name, importance) in artifact
        .estimator
        .ranked_importances(&artifact.metadata.feature_names)
        .into_iter()
        .take(8)
    {
        println!("  {:<30} {:.3}", name, importance);
    }

    // 3. Save and reload
    let path = std::env::temp_dir().join("flight_fare_example").join("random_forest.bin");
    artifact.save_to_file(&path)?;
    let predictor = Predictor::load(&path)?;
    println!("\nSaved and reloaded artifact from {}", path.display());

    // 4. Single-row predictions
    let sample = PredictionQuery::sample();
    println!("\nSample query: {}", sample.to_json()?);
    println!("Predicted price: {:.2}", predictor.predict(&sample)?);

    let direct = PredictionQuery {
        total_stops: Some(QueryValue::from("non-stop")),
        duration_minute: Some(QueryValue::from("2h 50m")),
        ..sample
    };
    println!("Same day, non-stop in 2h 50m: {:.2}", predictor.predict(&direct)?);

    let incomplete = PredictionQuery {
        airline: None,
        ..PredictionQuery::sample()
    };
    match predictor.predict(&incomplete) {
        Ok(price) => println!("Unexpected prediction {:.2}", price),
        Err(err) => println!("Incomplete query rejected: {}", err),
    }

    Ok(())
}
