//! Command-line parsing for the ridge logistic bias-variance tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/simulation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::SolverKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "rlogit",
    version,
    about = "Ridge-penalized logistic regression: bias-variance simulations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Simulate one train/test draw, fit every λ and print the per-λ table.
    ///
    /// Exits with code 5 (after printing) if any fit did not converge.
    Fit(FitArgs),
    /// Run the replicated experiment and print per-λ bias², variance and held-out metrics.
    Study(StudyArgs),
}

/// Options shared by `fit` and `study`: the simulated design, the λ grid and the solver.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Number of features.
    #[arg(short = 'p', long, default_value_t = 100)]
    pub p: usize,

    /// Training observations per draw.
    #[arg(short = 'n', long, default_value_t = 400)]
    pub n_train: usize,

    /// Held-out observations per draw.
    #[arg(long, default_value_t = 5000)]
    pub n_test: usize,

    /// Standard deviation of the true linear predictor (true weights are N(0, signal²/p)).
    #[arg(long, default_value_t = 1.0)]
    pub signal: f64,

    /// True intercept.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub intercept: f64,

    /// Random seed for the true model and the simulated samples.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Explicit λ values (comma-separated). Overrides the log grid.
    #[arg(long, value_delimiter = ',')]
    pub lambdas: Option<Vec<f64>>,

    /// Smallest positive λ of the log grid.
    #[arg(long, default_value_t = 0.001)]
    pub lambda_min: f64,

    /// Largest λ of the log grid.
    #[arg(long, default_value_t = 1.0)]
    pub lambda_max: f64,

    /// Number of log-spaced λ values.
    #[arg(long, default_value_t = 7)]
    pub lambda_steps: usize,

    /// Do not prepend the unpenalized fit (λ = 0) to the log grid.
    #[arg(long)]
    pub no_zero: bool,

    /// Solver for the penalized objective.
    #[arg(long, value_enum, default_value_t = SolverKind::GradientDescent)]
    pub solver: SolverKind,

    /// Maximum solver iterations per fit.
    #[arg(long, default_value_t = 20_000)]
    pub max_iter: usize,

    /// Gradient-norm convergence tolerance.
    #[arg(long, default_value_t = 1e-6)]
    pub tol: f64,

    /// Fit on the raw features instead of train-standardized ones.
    #[arg(long)]
    pub no_standardize: bool,

    /// Print the run report as JSON instead of tables.
    #[arg(long)]
    pub json: bool,
}

/// Options for `rlogit fit`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Print the first K true and estimated weights side by side.
    #[arg(long, value_name = "K", default_value_t = 0)]
    pub show_coefficients: usize,
}

/// Options for `rlogit study`.
#[derive(Debug, Args, Clone)]
pub struct StudyArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of independent train/test replicates.
    #[arg(short = 'r', long, default_value_t = 50)]
    pub replicates: usize,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 18)]
    pub height: usize,

    /// Export per-λ summaries to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Write an SVG chart of the bias-variance curves.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,
}
