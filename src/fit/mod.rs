//! Penalized logistic fitting.
//!
//! Responsibilities:
//!
//! - define the ridge-penalized objective, its gradient and Hessian
//! - minimize it with gradient descent or damped Newton
//! - validate inputs and report convergence explicitly
//! - build λ grids and warm-started λ paths

pub mod descent;
pub mod fitter;
pub mod newton;
pub mod objective;
pub mod path;

pub use fitter::*;
pub use objective::*;
pub use path::*;

use nalgebra::DVector;

use crate::domain::FitStatus;

/// Where a solver stopped; converted into a `PenalizedFit` by the fitter.
#[derive(Debug, Clone)]
pub(crate) struct SolverState {
    pub theta: DVector<f64>,
    pub status: FitStatus,
    pub iterations: usize,
    pub objective: f64,
    pub grad_norm: f64,
}

impl SolverState {
    pub fn new(
        theta: DVector<f64>,
        status: FitStatus,
        iterations: usize,
        objective: f64,
        grad_norm: f64,
    ) -> Self {
        Self {
            theta,
            status,
            iterations,
            objective,
            grad_norm,
        }
    }
}
