//! Yeo-Johnson power transform.
//!
//! Each column gets its own `lambda`, chosen by maximizing the Yeo-Johnson
//! log-likelihood with a golden-section search over `[-2, 2]`:
//! ```text
//! llf(lambda) = -n/2 * ln(var(psi(x, lambda))) + (lambda - 1) * sum(sign(x) * ln(|x| + 1))
//! ```
//! With `standardize` (the default) the transformed column is then shifted
//! and scaled by its fit-time mean and standard deviation.

use super::{ensure_finite, ensure_width};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

const LAMBDA_BOUNDS: (f64, f64) = (-2.0, 2.0);
const SEARCH_TOL: f64 = 1e-8;
const MAX_ITERATIONS: usize = 200;
const LAMBDA_EPS: f64 = 1e-12;

/// Yeo-Johnson transform of a single value.
pub fn yeo_johnson(x: f64, lambda: f64) -> f64 {
    if x >= 0.0 {
        if lambda.abs() < LAMBDA_EPS {
            x.ln_1p()
        } else {
            ((x + 1.0).powf(lambda) - 1.0) / lambda
        }
    } else if (lambda - 2.0).abs() < LAMBDA_EPS {
        -(-x).ln_1p()
    } else {
        -((1.0 - x).powf(2.0 - lambda) - 1.0) / (2.0 - lambda)
    }
}

fn population_moments(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = values.clone().count() as f64;
    let mean = values.clone().sum::<f64>() / n;
    let var = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var)
}

fn log_likelihood(column: ArrayView1<f64>, lambda: f64) -> f64 {
    let n = column.len() as f64;
    let (_, var) = population_moments(column.iter().map(|&x| yeo_johnson(x, lambda)));
    if !(var > 0.0) || !var.is_finite() {
        return f64::NEG_INFINITY;
    }
    let jacobian: f64 = column
        .iter()
        .map(|&x| x.signum() * x.abs().ln_1p())
        .sum();
    -0.5 * n * var.ln() + (lambda - 1.0) * jacobian
}

/// Golden-section search for the maximum of `llf` on `[lo, hi]`.
fn optimal_lambda(column: ArrayView1<f64>) -> f64 {
    let inv_phi = (5f64.sqrt() - 1.0) / 2.0;
    let (mut lo, mut hi) = LAMBDA_BOUNDS;
    let mut c = hi - inv_phi * (hi - lo);
    let mut d = lo + inv_phi * (hi - lo);
    let mut fc = log_likelihood(column, c);
    let mut fd = log_likelihood(column, d);

    for _ in 0..MAX_ITERATIONS {
        if (hi - lo).abs() < SEARCH_TOL {
            break;
        }
        if fc > fd {
            hi = d;
            d = c;
            fd = fc;
            c = hi - inv_phi * (hi - lo);
            fc = log_likelihood(column, c);
        } else {
            lo = c;
            c = d;
            fc = fd;
            d = lo + inv_phi * (hi - lo);
            fd = log_likelihood(column, d);
        }
    }
    (lo + hi) / 2.0
}

/// PowerTransformer (unfitted).
#[derive(Clone, Debug)]
pub struct PowerTransformer {
    standardize: bool,
}

impl Default for PowerTransformer {
    fn default() -> Self {
        Self { standardize: true }
    }
}

impl PowerTransformer {
    /// Yeo-Johnson followed by standardization.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle zero-mean / unit-variance scaling of the transformed output.
    pub fn with_standardize(mut self, standardize: bool) -> Self {
        self.standardize = standardize;
        self
    }
}

/// Fitted PowerTransformer ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedPowerTransformer {
    lambdas_: Vec<f64>,
    means_: Vec<f64>,
    scales_: Vec<f64>,
    standardize: bool,
}

impl FittedPowerTransformer {
    /// Per-column Yeo-Johnson lambdas.
    pub fn lambdas(&self) -> &[f64] {
        &self.lambdas_
    }

    /// Mean of each transformed column at fit time.
    pub fn means(&self) -> &[f64] {
        &self.means_
    }

    /// Standard deviation of each transformed column at fit time (1 if constant).
    pub fn scales(&self) -> &[f64] {
        &self.scales_
    }
}

impl Transformer for PowerTransformer {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Fitted = FittedPowerTransformer;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if data.nrows() == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit PowerTransformer on empty data".to_string(),
            ));
        }
        ensure_finite(data, "PowerTransformer")?;

        let n_cols = data.ncols();
        let mut lambdas_ = Vec::with_capacity(n_cols);
        let mut means_ = Vec::with_capacity(n_cols);
        let mut scales_ = Vec::with_capacity(n_cols);

        for column in data.axis_iter(Axis(1)) {
            let (_, raw_var) = population_moments(column.iter().copied());
            let lambda = if raw_var > 0.0 {
                optimal_lambda(column)
            } else {
                1.0
            };
            let (mean, var) =
                population_moments(column.iter().map(|&x| yeo_johnson(x, lambda)));
            let std = var.sqrt();

            lambdas_.push(lambda);
            means_.push(mean);
            scales_.push(if std > 0.0 && std.is_finite() { std } else { 1.0 });
        }

        Ok(FittedPowerTransformer {
            lambdas_,
            means_,
            scales_,
            standardize: self.standardize,
        })
    }
}

impl FittedTransformer for FittedPowerTransformer {
    type Input = Array2<f64>;
    type Output = Array2<f64>;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        ensure_width(data, self.lambdas_.len())?;

        let mut result = data.clone();
        for (col, mut column) in result.axis_iter_mut(Axis(1)).enumerate() {
            let lambda = self.lambdas_[col];
            let (mean, scale) = (self.means_[col], self.scales_[col]);
            column.mapv_inplace(|x| {
                let y = yeo_johnson(x, lambda);
                if self.standardize {
                    (y - mean) / scale
                } else {
                    y
                }
            });
        }
        Ok(result)
    }

    fn n_features_in(&self) -> usize {
        self.lambdas_.len()
    }
}
