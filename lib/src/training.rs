//! Training entry point: load, clean, split, fit, save, evaluate.

use crate::artifact::ModelArtifact;
use crate::cleaning::{Cleaner, StepReport};
use crate::config::PipelineConfig;
use crate::dataset::{load_frame, three_way_split};
use crate::error::{FareError, Result};
use crate::features::FeatureTransformSet;
use crate::frame::Frame;
use crate::metrics::{Metrics, RegressionMetrics};
use crate::model::{RandomForestRegressor, Regressor};
use crate::schema::{CleanedRecord, Column};
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// Metrics of one split.
#[derive(Debug, Clone, Serialize)]
pub struct SplitEvaluation {
    pub split: &'static str,
    pub metrics: RegressionMetrics,
}

/// Outcome of a training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub artifact: ModelArtifact,
    pub cleaning: Vec<StepReport>,
    pub rows_loaded: usize,
    pub rows_cleaned: usize,
    pub evaluations: Vec<SplitEvaluation>,
}

impl TrainingReport {
    pub fn evaluation(&self, split: &str) -> Option<&RegressionMetrics> {
        self.evaluations
            .iter()
            .find(|e| e.split == split)
            .map(|e| &e.metrics)
    }
}

/// Train on `config.data.input_path` and save to `config.data.model_path`.
pub fn train(config: &PipelineConfig) -> Result<TrainingReport> {
    config.validate()?;
    let frame = load_frame(&config.data.input_path)?;
    let report = train_from_frame(frame, config)?;
    report.artifact.save_to_file(&config.data.model_path)?;
    Ok(report)
}

/// Train on an in-memory raw frame; nothing is written.
pub fn train_from_frame(frame: Frame, config: &PipelineConfig) -> Result<TrainingReport> {
    let started = Instant::now();
    let rows_loaded = frame.n_rows();

    let outcome = Cleaner::new(config.cleaning.clone()).clean(frame)?;
    let cleaning = outcome.reports.clone();
    let records = outcome.into_records()?;
    info!(rows_loaded, rows_cleaned = records.len(), "cleaned input");

    let split = three_way_split(&records, &config.split)?;
    info!(
        train = split.train.len(),
        validation = split.validation.len(),
        test = split.test.len(),
        "split records"
    );

    let y_train = targets(&split.train)?;
    let features = FeatureTransformSet::from_config(&config.features).fit(&split.train, &y_train)?;
    let x_train = features.apply(&split.train)?;

    let estimator = RandomForestRegressor::new(config.model.clone()).fit(x_train.view(), &y_train)?;
    let artifact = ModelArtifact::new(features, estimator, split.train.len())?;

    let mut evaluations = Vec::with_capacity(3);
    for (name, part) in [
        ("train", &split.train),
        ("validation", &split.validation),
        ("test", &split.test),
    ] {
        let metrics = evaluate(&artifact, part)?;
        info!(split = name, %metrics, "evaluation");
        evaluations.push(SplitEvaluation { split: name, metrics });
    }

    info!(elapsed_ms = started.elapsed().as_millis() as u64, "training finished");
    Ok(TrainingReport {
        artifact,
        cleaning,
        rows_loaded,
        rows_cleaned: records.len(),
        evaluations,
    })
}

/// Score the artifact on labelled records.
///
/// Adjusted R² counts the cleaned input columns as predictors, not the
/// engineered feature columns.
pub fn evaluate(artifact: &ModelArtifact, records: &[CleanedRecord]) -> Result<RegressionMetrics> {
    let y_true = targets(records)?;
    let y_pred = artifact.predict(records)?;
    Metrics::calculate_all(&y_true, &y_pred.to_vec(), Column::INPUTS.len())
}

fn targets(records: &[CleanedRecord]) -> Result<Vec<f64>> {
    records
        .iter()
        .enumerate()
        .map(|(row, r)| {
            r.price
                .ok_or_else(|| FareError::schema(format!("row {} has no price to train on", row)))
        })
        .collect()
}
