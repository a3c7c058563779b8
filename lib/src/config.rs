//! Pipeline configuration, loadable from TOML.
//!
//! Every section falls back to its defaults, so a config file only needs the
//! values it changes:
//!
//! ```toml
//! [data]
//! input_path = "data/flight_price.csv"
//!
//! [cleaning]
//! policy = "fail_fast"
//!
//! [features]
//! rare_tol = 0.05
//! part_of_day = { mid = 6, end = 18 }
//!
//! [model]
//! n_trees = 50
//! max_features = { fraction = 0.5 }
//! ```

use crate::cleaning::CleaningConfig;
use crate::error::{FareError, Result};
use crate::features::{PartOfDayBounds, NORTH_CITIES};
use crate::model::ForestConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Raw input CSV.
    pub input_path: PathBuf,
    /// Where the trained artifact is written and read.
    pub model_path: PathBuf,
    /// Output directory of `split_and_save`.
    pub split_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/flight_price.csv"),
            model_path: PathBuf::from("models/random_forest.bin"),
            split_dir: PathBuf::from("data/splits"),
        }
    }
}

/// Feature engineering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Minimum category share kept by rare-label grouping.
    pub rare_tol: f64,
    /// Variables with at most this many categories are not grouped.
    pub rare_n_categories: usize,
    /// Catch-all label for rare categories.
    pub rare_replace_with: String,
    /// M-estimate smoothing of the target-mean encoder (0 = plain mean).
    pub mean_smoothing: f64,
    pub part_of_day: PartOfDayBounds,
    pub north_cities: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            rare_tol: 0.1,
            rare_n_categories: 2,
            rare_replace_with: "other".to_string(),
            mean_smoothing: 0.0,
            part_of_day: PartOfDayBounds::default(),
            north_cities: NORTH_CITIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Train / validation / test split parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub seed: u64,
    /// Share of all rows held out as the test split.
    pub test_size: f64,
    /// Share of the remaining rows held out as the validation split.
    pub validation_size: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_size: 0.2,
            validation_size: 0.2,
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("test_size", self.test_size), ("validation_size", self.validation_size)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(FareError::Config(format!(
                    "split.{} must be within (0, 1), got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data: DataConfig,
    pub cleaning: CleaningConfig,
    pub features: FeatureConfig,
    pub split: SplitConfig,
    pub model: ForestConfig,
}

impl PipelineConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig =
            toml::from_str(content).map_err(|e| FareError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| FareError::from_io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FareError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.split.validate()?;
        self.model.validate()?;
        if !(0.0..=1.0).contains(&self.features.rare_tol) {
            return Err(FareError::Config(format!(
                "features.rare_tol must be within [0, 1], got {}",
                self.features.rare_tol
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::ErrorPolicy;
    use crate::model::MaxFeatures;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.model.n_trees, 150);
        assert_eq!(config.model.max_depth, 20);
        assert_eq!(config.model.max_features, MaxFeatures::Fraction(0.5));
        assert_eq!(config.split.seed, 42);
        assert_eq!(config.features.part_of_day, PartOfDayBounds { mid: 8, end: 16 });
        assert_eq!(config.data.model_path, PathBuf::from("models/random_forest.bin"));
        assert_eq!(config.cleaning.corrupt_duration, "5m");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [cleaning]
            policy = "fail_fast"

            [features]
            rare_tol = 0.05
            part_of_day = { mid = 6, end = 18 }

            [model]
            n_trees = 10
            max_features = { fraction = 0.3 }
            "#,
        )
        .unwrap();

        assert_eq!(config.cleaning.policy, ErrorPolicy::FailFast);
        assert_eq!(config.features.rare_tol, 0.05);
        assert_eq!(config.features.part_of_day, PartOfDayBounds { mid: 6, end: 18 });
        assert_eq!(config.features.rare_n_categories, 2);
        assert_eq!(config.model.n_trees, 10);
        assert_eq!(config.model.max_features, MaxFeatures::Fraction(0.3));
        assert_eq!(config.model.max_depth, 20);
        assert_eq!(config.split, SplitConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig::default();
        let rendered = config.to_toml_string().unwrap();
        assert_eq!(PipelineConfig::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = PipelineConfig::from_toml_str("[split]\ntest_size = 1.5\n").unwrap_err();
        assert!(matches!(err, FareError::Config(_)));

        let err = PipelineConfig::from_toml_str("[model]\nn_trees = 0\n").unwrap_err();
        assert!(matches!(err, FareError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = PipelineConfig::from_file("/nonexistent/flight_fare.toml").unwrap_err();
        assert!(matches!(err, FareError::NotFound(_)));
    }
}
