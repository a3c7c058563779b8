//! Regression metrics for evaluating price predictions.

use crate::error::{FareError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics for evaluating regression models.
pub struct Metrics;

impl Metrics {
    /// Mean Squared Error, `mean((y_true - y_pred)^2)`.
    pub fn mse(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
        ensure_same_len(y_true, y_pred)?;
        let sum_sq: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();
        Ok(sum_sq / y_true.len() as f64)
    }

    /// Root Mean Squared Error, in the units of the target.
    pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
        Ok(Self::mse(y_true, y_pred)?.sqrt())
    }

    /// Mean Absolute Error, `mean(|y_true - y_pred|)`.
    pub fn mae(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
        ensure_same_len(y_true, y_pred)?;
        let sum_abs: f64 = y_true.iter().zip(y_pred).map(|(&t, &p)| (t - p).abs()).sum();
        Ok(sum_abs / y_true.len() as f64)
    }

    /// R² (coefficient of determination), `1 - SS_res / SS_tot`.
    ///
    /// Negative when the model is worse than predicting the mean. A constant
    /// target gives 1 for a perfect prediction and 0 otherwise.
    pub fn r_squared(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
        ensure_same_len(y_true, y_pred)?;
        let mean_true = y_true.iter().sum::<f64>() / y_true.len() as f64;

        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();
        let ss_tot: f64 = y_true.iter().map(|&t| (t - mean_true).powi(2)).sum();

        if ss_tot == 0.0 {
            return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
        }
        Ok(1.0 - ss_res / ss_tot)
    }

    /// Adjusted R² for `n_features` predictors,
    /// `1 - (1 - R²)(n - 1) / (n - p - 1)`.
    ///
    /// `None` when `n - p - 1 <= 0`.
    pub fn adjusted_r_squared(r_squared: f64, n_samples: usize, n_features: usize) -> Option<f64> {
        let dof = n_samples.checked_sub(n_features + 1).filter(|&d| d > 0)?;
        Some(1.0 - (1.0 - r_squared) * (n_samples as f64 - 1.0) / dof as f64)
    }

    /// All metrics at once.
    pub fn calculate_all(y_true: &[f64], y_pred: &[f64], n_features: usize) -> Result<RegressionMetrics> {
        let mse = Self::mse(y_true, y_pred)?;
        let r_squared = Self::r_squared(y_true, y_pred)?;
        Ok(RegressionMetrics {
            n_samples: y_true.len(),
            mse,
            rmse: mse.sqrt(),
            mae: Self::mae(y_true, y_pred)?,
            r_squared,
            adjusted_r_squared: Self::adjusted_r_squared(r_squared, y_true.len(), n_features),
        })
    }
}

fn ensure_same_len(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(FareError::Value(format!(
            "{} targets but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(FareError::Value("cannot score zero predictions".to_string()));
    }
    Ok(())
}

/// All regression metrics of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub n_samples: usize,
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r_squared: f64,
    pub adjusted_r_squared: Option<f64>,
}

impl fmt::Display for RegressionMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={} R2={:.4} ", self.n_samples, self.r_squared)?;
        match self.adjusted_r_squared {
            Some(adj) => write!(f, "adj_R2={:.4} ", adj)?,
            None => write!(f, "adj_R2=n/a ")?,
        }
        write!(f, "RMSE={:.2} MAE={:.2}", self.rmse, self.mae)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mse_perfect() {
        let y = [1.0, 2.0, 3.0];
        assert_eq!(Metrics::mse(&y, &y).unwrap(), 0.0);
    }

    #[test]
    fn test_mse_rmse_error() {
        let y_true = [1.0, 2.0, 3.0];
        let y_pred = [2.0, 3.0, 4.0];
        assert!((Metrics::mse(&y_true, &y_pred).unwrap() - 1.0).abs() < 1e-12);
        assert!((Metrics::rmse(&[0.0, 0.0], &[3.0, -3.0]).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_mae() {
        let y_true = [1.0, 2.0, 3.0];
        let y_pred = [2.0, 1.0, 5.0];
        assert!((Metrics::mae(&y_true, &y_pred).unwrap() - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_r_squared_perfect_and_mean() {
        let y = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(Metrics::r_squared(&y, &y).unwrap(), 1.0);
        let mean = [2.5; 4];
        assert!(Metrics::r_squared(&y, &mean).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_r_squared_constant_target() {
        let y = [5.0, 5.0];
        assert_eq!(Metrics::r_squared(&y, &y).unwrap(), 1.0);
        assert_eq!(Metrics::r_squared(&y, &[5.0, 6.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_adjusted_r_squared() {
        let adj = Metrics::adjusted_r_squared(0.9, 101, 10).unwrap();
        assert!((adj - (1.0 - 0.1 * 100.0 / 90.0)).abs() < 1e-12);
        assert_eq!(Metrics::adjusted_r_squared(0.9, 11, 10), None);
        assert_eq!(Metrics::adjusted_r_squared(0.9, 5, 10), None);
    }

    #[test]
    fn test_length_mismatch_and_empty() {
        assert!(matches!(Metrics::mse(&[1.0], &[1.0, 2.0]), Err(FareError::Value(_))));
        assert!(Metrics::r_squared(&[], &[]).is_err());
    }

    #[test]
    fn test_calculate_all_and_display() {
        let y_true = [3.0, -0.5, 2.0, 7.0];
        let y_pred = [2.5, 0.0, 2.0, 8.0];
        let m = Metrics::calculate_all(&y_true, &y_pred, 1).unwrap();

        assert_eq!(m.n_samples, 4);
        assert!((m.mse - 0.375).abs() < 1e-12);
        assert!((m.mae - 0.5).abs() < 1e-12);
        assert!((m.rmse - 0.375f64.sqrt()).abs() < 1e-12);
        assert!((m.r_squared - 0.948_608_137_045_0).abs() < 1e-9);
        assert!(m.adjusted_r_squared.is_some());

        let shown = m.to_string();
        assert!(shown.starts_with("n=4 R2=0.9486"));
        assert!(shown.contains("MAE=0.50"));
    }
}
