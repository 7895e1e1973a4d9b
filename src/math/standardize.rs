//! Column standardization for design matrices.
//!
//! The ridge penalty treats every weight alike, so features are put on a common
//! scale before fitting: statistics come from the training matrix only and are
//! then applied unchanged to held-out data.

use nalgebra::{DMatrix, DVector};

use crate::domain::Coefficients;
use crate::error::FitError;

/// Per-column location/scale learned from a training matrix.
#[derive(Debug, Clone)]
pub struct Standardizer {
    means: DVector<f64>,
    scales: DVector<f64>,
}

impl Standardizer {
    /// Learn column means and population standard deviations.
    pub fn fit(x: &DMatrix<f64>) -> Result<Self, FitError> {
        let n = x.nrows();
        if n == 0 {
            return Err(FitError::Empty);
        }

        let p = x.ncols();
        let mut means = DVector::zeros(p);
        let mut scales = DVector::zeros(p);
        for (j, col) in x.column_iter().enumerate() {
            let mean = col.sum() / n as f64;
            let var = col.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
            let sd = var.sqrt();
            if !(sd.is_finite() && sd > 1e-12) {
                return Err(FitError::ConstantColumn { column: j });
            }
            means[j] = mean;
            scales[j] = sd;
        }

        Ok(Self { means, scales })
    }

    /// A no-op standardizer (mean 0, scale 1) for `p` columns.
    pub fn identity(p: usize) -> Self {
        Self {
            means: DVector::zeros(p),
            scales: DVector::from_element(p, 1.0),
        }
    }

    pub fn means(&self) -> &DVector<f64> {
        &self.means
    }

    pub fn scales(&self) -> &DVector<f64> {
        &self.scales
    }

    /// Apply the learned statistics: `z_ij = (x_ij − μ_j) / σ_j`.
    pub fn transform(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>, FitError> {
        if x.ncols() != self.means.len() {
            return Err(FitError::FeatureCountMismatch {
                expected: self.means.len(),
                actual: x.ncols(),
            });
        }

        let mut out = x.clone();
        for (j, mut col) in out.column_iter_mut().enumerate() {
            let (mean, sd) = (self.means[j], self.scales[j]);
            col.apply(|v| *v = (*v - mean) / sd);
        }
        Ok(out)
    }

    /// Map coefficients fitted on standardized columns back to the raw scale.
    ///
    /// `η = β₀ + Σ βⱼ (xⱼ − μⱼ)/σⱼ`, so `βⱼ_raw = βⱼ/σⱼ` and
    /// `β₀_raw = β₀ − Σ βⱼ μⱼ/σⱼ`.
    pub fn to_raw_scale(&self, coef: &Coefficients) -> Result<Coefficients, FitError> {
        if coef.n_features() != self.scales.len() {
            return Err(FitError::FeatureCountMismatch {
                expected: self.scales.len(),
                actual: coef.n_features(),
            });
        }

        let weights = coef.weights().component_div(&self.scales);
        let intercept = coef.intercept() - weights.dot(&self.means);
        Ok(Coefficients::new(intercept, weights))
    }
}
