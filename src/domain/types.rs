//! Shared domain types.
//!
//! These types are kept lightweight so they can be:
//!
//! - passed between the fitter, the simulation and the study
//! - rendered into terminal tables and charts
//! - serialized into the JSON report

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Which iterative solver minimizes the penalized objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    /// Nesterov-accelerated gradient descent with backtracking and restart.
    #[value(name = "gd")]
    #[serde(rename = "gd")]
    GradientDescent,
    /// Damped Newton (IRLS-equivalent) with Armijo backtracking.
    Newton,
}

impl SolverKind {
    pub fn display_name(self) -> &'static str {
        match self {
            SolverKind::GradientDescent => "gradient descent",
            SolverKind::Newton => "newton",
        }
    }
}

/// Terminal state of a single fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStatus {
    /// Gradient-norm (or objective-change) tolerance satisfied.
    Converged,
    /// Iteration budget exhausted before the tolerance was met.
    MaxIterations,
    /// An iterate strictly separated the classes at λ = 0; the MLE does not exist.
    Separated,
    /// The line search could not make progress.
    Stalled,
}

impl fmt::Display for FitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FitStatus::Converged => "converged",
            FitStatus::MaxIterations => "max iterations",
            FitStatus::Separated => "perfect separation",
            FitStatus::Stalled => "line search stalled",
        };
        f.write_str(label)
    }
}

/// Intercept plus feature weights of a logistic model.
///
/// Fields are private: a fitted coefficient set is read-only once returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    intercept: f64,
    weights: DVector<f64>,
}

impl Coefficients {
    pub fn new(intercept: f64, weights: DVector<f64>) -> Self {
        Self { intercept, weights }
    }

    pub fn zeros(p: usize) -> Self {
        Self::new(0.0, DVector::zeros(p))
    }

    /// Unpack a parameter vector laid out as `[β₀, β₁ … β_p]`.
    pub fn from_theta(theta: &DVector<f64>) -> Self {
        let p = theta.len().saturating_sub(1);
        Self {
            intercept: theta[0],
            weights: theta.rows(1, p).into_owned(),
        }
    }

    /// Pack into a parameter vector laid out as `[β₀, β₁ … β_p]`.
    pub fn to_theta(&self) -> DVector<f64> {
        let p = self.weights.len();
        let mut theta = DVector::zeros(p + 1);
        theta[0] = self.intercept;
        theta.rows_mut(1, p).copy_from(&self.weights);
        theta
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn weights(&self) -> &DVector<f64> {
        &self.weights
    }

    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    /// Σⱼ βⱼ² over feature weights only (the penalized quantity).
    pub fn weight_norm_sq(&self) -> f64 {
        self.weights.norm_squared()
    }

    /// Euclidean norm of the feature weights.
    pub fn weight_norm(&self) -> f64 {
        self.weights.norm()
    }
}

/// Solver configuration for a single fit.
#[derive(Debug, Clone)]
pub struct FitOptions {
    pub solver: SolverKind,
    /// Maximum number of parameter updates.
    pub max_iter: usize,
    /// Converged when the Euclidean gradient norm drops to this value.
    pub grad_tol: f64,
    /// Also converged when the relative objective change drops to this value.
    /// `0.0` disables the check.
    pub obj_tol: f64,
    /// Optional starting point (defaults to all zeros).
    pub warm_start: Option<Coefficients>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            solver: SolverKind::GradientDescent,
            max_iter: 20_000,
            grad_tol: 1e-6,
            obj_tol: 0.0,
            warm_start: None,
        }
    }
}

/// Output of the penalized fitter.
#[derive(Debug, Clone)]
pub struct PenalizedFit {
    pub lambda: f64,
    pub coefficients: Coefficients,
    pub status: FitStatus,
    pub iterations: usize,
    /// Penalized objective at the returned coefficients.
    pub objective: f64,
    /// Euclidean norm of the penalized gradient at the returned coefficients.
    pub grad_norm: f64,
    pub solver: SolverKind,
}

impl PenalizedFit {
    pub fn converged(&self) -> bool {
        self.status == FitStatus::Converged
    }

    /// Turn a non-converged fit into an error instead of a partial estimate.
    pub fn ensure_converged(self) -> Result<Self, crate::error::FitError> {
        if self.converged() {
            Ok(self)
        } else {
            Err(crate::error::FitError::NotConverged {
                status: self.status,
                iterations: self.iterations,
                grad_norm: self.grad_norm,
            })
        }
    }
}

/// A labeled design: `x` is n×p, `y` holds n labels in {0, 1}.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
}

impl Dataset {
    pub fn n(&self) -> usize {
        self.x.nrows()
    }

    pub fn p(&self) -> usize {
        self.x.ncols()
    }

    /// Fraction of positive labels.
    pub fn prevalence(&self) -> f64 {
        if self.y.is_empty() {
            return 0.0;
        }
        self.y.sum() / self.y.len() as f64
    }
}

/// The data-generating coefficients of a simulation.
#[derive(Debug, Clone)]
pub struct TrueModel {
    pub coefficients: Coefficients,
    /// Standard deviation the weights were drawn with (`signal / sqrt(p)`).
    pub weight_sd: f64,
}

/// Held-out performance of one coefficient set.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HeldOutMetrics {
    pub log_loss: f64,
    pub auc: Option<f64>,
    pub accuracy: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone, Serialize)]
pub struct StudyConfig {
    pub p: usize,
    pub n_train: usize,
    pub n_test: usize,
    /// Standard deviation of the true linear predictor (`‖β*‖ ≈ signal`).
    pub signal: f64,
    pub intercept: f64,
    pub seed: u64,
    pub replicates: usize,
    pub lambdas: Vec<f64>,
    pub standardize: bool,

    pub solver: SolverKind,
    pub max_iter: usize,
    pub grad_tol: f64,

    /// Number of leading weights to print next to the truth (`fit` only).
    pub show_coefficients: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_csv: Option<PathBuf>,
    pub export_svg: Option<PathBuf>,
    pub json: bool,
}

impl StudyConfig {
    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            solver: self.solver,
            max_iter: self.max_iter,
            grad_tol: self.grad_tol,
            ..FitOptions::default()
        }
    }
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            p: 100,
            n_train: 400,
            n_test: 5000,
            signal: 1.0,
            intercept: 0.0,
            seed: 42,
            replicates: 50,
            lambdas: vec![0.0, 0.001, 0.01, 0.03, 0.1, 0.3, 1.0],
            standardize: true,
            solver: SolverKind::GradientDescent,
            max_iter: 20_000,
            grad_tol: 1e-6,
            show_coefficients: 0,
            plot: true,
            plot_width: 72,
            plot_height: 18,
            export_csv: None,
            export_svg: None,
            json: false,
        }
    }
}

/// Bias-variance aggregate for one λ across replicates.
#[derive(Debug, Clone, Serialize)]
pub struct LambdaSummary {
    pub lambda: f64,
    /// Replicates whose fit converged (the aggregates below use only these).
    pub converged: usize,
    pub failures: usize,
    pub mean_norm_sq: f64,
    /// ‖mean β̂ − β*‖².
    pub bias_sq: f64,
    /// Mean ‖β̂ − mean β̂‖².
    pub variance: f64,
    /// `bias_sq + variance` (mean ‖β̂ − β*‖²).
    pub coef_mse: f64,
    pub mean_train_objective: f64,
    pub mean_test_log_loss: f64,
    pub sd_test_log_loss: f64,
    pub mean_test_auc: f64,
    pub mean_test_accuracy: f64,
    pub mean_iterations: f64,
}
