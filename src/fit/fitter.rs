//! The penalized fitter: input validation and solver dispatch.
//!
//! Given:
//! - a design matrix `X` (n×p, typically standardized)
//! - a binary response `y`
//! - a penalty strength `λ ≥ 0`
//!
//! we minimize the ridge-penalized logistic objective (see [`objective`]) and
//! return the intercept, the feature weights and the solver's terminal status.
//!
//! [`objective`]: crate::fit::objective

use nalgebra::{DMatrix, DVector};

use crate::domain::{Coefficients, FitOptions, PenalizedFit, SolverKind};
use crate::error::FitError;
use crate::fit::objective::PenalizedObjective;
use crate::fit::{descent, newton};

/// Fit a ridge-penalized logistic regression.
///
/// Non-convergence is not an error here: it is reported through
/// [`PenalizedFit::status`]. Use [`PenalizedFit::ensure_converged`] to treat it
/// as one.
pub fn fit_penalized(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    lambda: f64,
    opts: &FitOptions,
) -> Result<PenalizedFit, FitError> {
    validate_inputs(x, y, lambda, opts)?;

    let p = x.ncols();
    let theta0 = match &opts.warm_start {
        Some(start) => start.to_theta(),
        None => DVector::zeros(p + 1),
    };

    let obj = PenalizedObjective::new(x, y, lambda);
    let state = match opts.solver {
        SolverKind::GradientDescent => descent::minimize(&obj, theta0, opts),
        SolverKind::Newton => newton::minimize(&obj, theta0, opts),
    };

    let fit = PenalizedFit {
        lambda,
        coefficients: Coefficients::from_theta(&state.theta),
        status: state.status,
        iterations: state.iterations,
        objective: state.objective,
        grad_norm: state.grad_norm,
        solver: opts.solver,
    };

    log::debug!(
        "fit λ={lambda} solver={} status={} iters={} L={:.6} |g|={:.2e} |β|²={:.4}",
        opts.solver.display_name(),
        fit.status,
        fit.iterations,
        fit.objective,
        fit.grad_norm,
        fit.coefficients.weight_norm_sq(),
    );

    Ok(fit)
}

/// Fit a sequence of penalties on the same data, warm-starting each fit from the
/// previous converged solution.
///
/// The returned fits are in the same order as `lambdas`.
pub fn fit_path(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    lambdas: &[f64],
    opts: &FitOptions,
) -> Result<Vec<PenalizedFit>, FitError> {
    let mut fits = Vec::with_capacity(lambdas.len());
    let mut warm = opts.warm_start.clone();

    for &lambda in lambdas {
        let step_opts = FitOptions {
            warm_start: warm.clone(),
            ..opts.clone()
        };
        let fit = fit_penalized(x, y, lambda, &step_opts)?;
        if fit.converged() {
            warm = Some(fit.coefficients.clone());
        }
        fits.push(fit);
    }

    Ok(fits)
}

fn validate_inputs(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    lambda: f64,
    opts: &FitOptions,
) -> Result<(), FitError> {
    if x.nrows() != y.len() {
        return Err(FitError::DimensionMismatch {
            rows: x.nrows(),
            labels: y.len(),
        });
    }
    if x.nrows() == 0 {
        return Err(FitError::Empty);
    }
    if !(lambda.is_finite() && lambda >= 0.0) {
        return Err(FitError::InvalidPenalty(lambda));
    }
    if let Some((index, &value)) = y
        .iter()
        .enumerate()
        .find(|(_, v)| **v != 0.0 && **v != 1.0)
    {
        return Err(FitError::NonBinaryResponse { index, value });
    }
    if y.iter().all(|&v| v == y[0]) {
        return Err(FitError::SingleClass { label: y[0] });
    }
    for (col, column) in x.column_iter().enumerate() {
        if let Some(row) = column.iter().position(|v| !v.is_finite()) {
            return Err(FitError::NonFiniteDesign { row, col });
        }
    }

    if opts.max_iter == 0 {
        return Err(FitError::InvalidOptions("max_iter must be >= 1".to_string()));
    }
    if !(opts.grad_tol.is_finite() && opts.grad_tol > 0.0) {
        return Err(FitError::InvalidOptions(format!(
            "grad_tol must be finite and > 0, got {}",
            opts.grad_tol
        )));
    }
    if !(opts.obj_tol.is_finite() && opts.obj_tol >= 0.0) {
        return Err(FitError::InvalidOptions(format!(
            "obj_tol must be finite and >= 0, got {}",
            opts.obj_tol
        )));
    }
    if let Some(start) = &opts.warm_start {
        if start.n_features() != x.ncols() {
            return Err(FitError::FeatureCountMismatch {
                expected: x.ncols(),
                actual: start.n_features(),
            });
        }
    }

    Ok(())
}
