//! The persisted model: fitted feature transforms, fitted forest, metadata.

use crate::error::{FareError, Result};
use crate::features::FittedFeatureTransformSet;
use crate::model::{FittedRandomForest, FittedRegressor};
use crate::schema::CleanedRecord;
use crate::serialization::SerializableParams;
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Provenance of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub created_at: DateTime<Utc>,
    /// Version of this crate that wrote the artifact.
    pub crate_version: String,
    pub n_training_rows: usize,
    pub feature_names: Vec<String>,
}

/// Everything inference needs, written once per training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub metadata: ArtifactMetadata,
    pub features: FittedFeatureTransformSet,
    pub estimator: FittedRandomForest,
}

impl ModelArtifact {
    /// Bundle fitted state; fails if the two halves disagree on width.
    pub fn new(
        features: FittedFeatureTransformSet,
        estimator: FittedRandomForest,
        n_training_rows: usize,
    ) -> Result<Self> {
        if features.n_features_out() != estimator.n_features_in() {
            return Err(FareError::Model(format!(
                "feature set produces {} columns but the estimator expects {}",
                features.n_features_out(),
                estimator.n_features_in()
            )));
        }
        Ok(Self {
            metadata: ArtifactMetadata {
                created_at: Utc::now(),
                crate_version: env!("CARGO_PKG_VERSION").to_string(),
                n_training_rows,
                feature_names: features.feature_names().to_vec(),
            },
            features,
            estimator,
        })
    }

    /// Feature matrix for cleaned rows.
    pub fn preprocess(&self, records: &[CleanedRecord]) -> Result<Array2<f64>> {
        Ok(self.features.apply(records)?)
    }

    /// One price per row.
    pub fn predict(&self, records: &[CleanedRecord]) -> Result<Array1<f64>> {
        let x = self.preprocess(records)?;
        self.estimator.predict(x.view())
    }

    /// Write the artifact, creating parent directories.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "saved model artifact");
        Ok(())
    }

    /// Read an artifact written by [`ModelArtifact::save_to_file`].
    ///
    /// # Errors
    /// [`FareError::NotFound`] if the file does not exist.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| FareError::from_io(path, e))?;
        let artifact = Self::from_bytes(&bytes)?;
        info!(
            path = %path.display(),
            created_at = %artifact.metadata.created_at,
            n_features = artifact.metadata.feature_names.len(),
            "loaded model artifact"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::Cleaner;
    use crate::config::FeatureConfig;
    use crate::features::FeatureTransformSet;
    use crate::model::{ForestConfig, RandomForestRegressor, Regressor};
    use crate::synthetic::SyntheticFlights;

    fn fitted(n: usize) -> (ModelArtifact, Vec<CleanedRecord>) {
        let frame = SyntheticFlights::new(21).frame(n).unwrap();
        let records = Cleaner::default().clean_records(frame).unwrap();
        let target: Vec<f64> = records.iter().filter_map(|r| r.price).collect();

        let features = FeatureTransformSet::from_config(&FeatureConfig::default())
            .fit(&records, &target)
            .unwrap();
        let x = features.apply(&records).unwrap();
        let forest = RandomForestRegressor::new(ForestConfig {
            n_trees: 5,
            ..ForestConfig::default()
        })
        .fit(x.view(), &target)
        .unwrap();

        let artifact = ModelArtifact::new(features, forest, records.len()).unwrap();
        (artifact, records)
    }

    #[test]
    fn test_artifact_predicts_each_row() {
        let (artifact, records) = fitted(200);
        let predictions = artifact.predict(&records[..10]).unwrap();
        assert_eq!(predictions.len(), 10);
        assert!(predictions.iter().all(|p| p.is_finite() && *p > 0.0));
        assert_eq!(artifact.metadata.n_training_rows, records.len());
        assert_eq!(artifact.metadata.feature_names, artifact.features.feature_names());
    }

    #[test]
    fn test_save_and_load() {
        let (artifact, records) = fitted(150);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("random_forest.bin");

        artifact.save_to_file(&path).unwrap();
        let loaded = ModelArtifact::load_from_file(&path).unwrap();

        assert_eq!(loaded, artifact);
        assert_eq!(loaded.predict(&records).unwrap(), artifact.predict(&records).unwrap());
    }

    #[test]
    fn test_load_missing_artifact() {
        let err = ModelArtifact::load_from_file("/nonexistent/random_forest.bin").unwrap_err();
        assert!(matches!(err, FareError::NotFound(_)));
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let (artifact, _) = fitted(120);
        let x = ndarray::Array2::from_shape_fn((20, 2), |(i, j)| (i + j) as f64);
        let y: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let narrow = RandomForestRegressor::new(ForestConfig {
            n_trees: 2,
            ..ForestConfig::default()
        })
        .fit(x.view(), &y)
        .unwrap();

        let err = ModelArtifact::new(artifact.features, narrow, 20).unwrap_err();
        assert!(matches!(err, FareError::Model(_)));
    }
}
