//! `flight-fare` command-line interface.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flight_fare::cleaning::Cleaner;
use flight_fare::dataset::{load_frame, split_and_save};
use flight_fare::{train, PipelineConfig, PredictionQuery, Predictor};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flight-fare")]
#[command(about = "Train and query a flight price model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log per-step detail
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean, split, fit and save the model, then report metrics
    Train,

    /// Predict the price of one query
    Predict {
        /// JSON object with the query fields; the sample query if omitted
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Clean the input and write train/validation/test CSVs
    Split,
}

fn main() {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "flight_fare=debug"
    } else {
        "flight_fare=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_target(false)
        .init();

    if let Err(err) = run(cli) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Train => {
            let report = train(&config).context("training failed")?;
            for evaluation in &report.evaluations {
                println!("{:<10} {}", evaluation.split, evaluation.metrics);
            }
            let names = &report.artifact.metadata.feature_names;
            for (name, importance) in report.artifact.estimator.ranked_importances(names).into_iter().take(5) {
                info!(feature = name, importance, "top feature");
            }
            println!("model saved to {}", config.data.model_path.display());
        }
        Commands::Predict { query } => {
            let query = match query {
                Some(json) => PredictionQuery::from_json(&json)?,
                None => PredictionQuery::sample(),
            };
            let predictor = Predictor::load(&config.data.model_path)?;
            let price = predictor.predict(&query)?;
            println!("{:.2}", price);
        }
        Commands::Split => {
            let frame = load_frame(&config.data.input_path)?;
            let records = Cleaner::new(config.cleaning.clone()).clean_records(frame)?;
            let split = split_and_save(&records, &config.split, &config.data.split_dir)?;
            println!(
                "train={} validation={} test={} written to {}",
                split.train.len(),
                split.validation.len(),
                split.test.len(),
                config.data.split_dir.display()
            );
        }
    }
    Ok(())
}
