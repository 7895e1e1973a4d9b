//! Model evaluation for a logistic model.
//!
//! The fitter, metrics and study all rely on two primitive operations:
//! - the linear predictor `η = β₀ + Xβ`
//! - the predicted probability `h(η)`

use nalgebra::{DMatrix, DVector};

use crate::domain::Coefficients;
use crate::math::sigmoid;

/// Linear predictor for every row of `x`.
///
/// # Panics
/// Panics if `x.ncols()` differs from the number of weights. Callers size these
/// correctly (the fitter validates shapes up front).
pub fn linear_predictor(x: &DMatrix<f64>, coef: &Coefficients) -> DVector<f64> {
    let mut eta = x * coef.weights();
    eta.add_scalar_mut(coef.intercept());
    eta
}

/// Predicted `P(y = 1)` for every row of `x`.
pub fn predict_proba(x: &DMatrix<f64>, coef: &Coefficients) -> DVector<f64> {
    linear_predictor(x, coef).map(sigmoid)
}
