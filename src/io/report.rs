//! JSON run reports.
//!
//! The JSON report is the machine-readable counterpart of the terminal tables:
//! - run configuration and the true coefficients
//! - per-λ results (fits for `fit`, aggregates for `study`)
//!
//! Non-finite numbers (e.g. aggregates of a λ with no converged fit) are
//! written as `null`.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::domain::{FitStatus, HeldOutMetrics, LambdaSummary, StudyConfig, TrueModel};
use crate::error::AppError;
use crate::study::{Replicate, StudyOutput};

#[derive(Debug, Serialize)]
struct TruthJson {
    intercept: f64,
    weights: Vec<f64>,
    weight_norm_sq: f64,
    weight_sd: f64,
}

impl TruthJson {
    fn new(truth: &TrueModel) -> Self {
        Self {
            intercept: truth.coefficients.intercept(),
            weights: truth.coefficients.weights().iter().copied().collect(),
            weight_norm_sq: truth.coefficients.weight_norm_sq(),
            weight_sd: truth.weight_sd,
        }
    }
}

#[derive(Debug, Serialize)]
struct FitJson {
    lambda: f64,
    status: FitStatus,
    converged: bool,
    iterations: usize,
    train_objective: f64,
    intercept: f64,
    weights: Vec<f64>,
    weight_norm_sq: f64,
    test: HeldOutMetrics,
}

#[derive(Debug, Serialize)]
struct FitReportJson<'a> {
    tool: &'static str,
    command: &'static str,
    generated_at: DateTime<Local>,
    config: &'a StudyConfig,
    truth: TruthJson,
    train_prevalence: f64,
    oracle: HeldOutMetrics,
    fits: Vec<FitJson>,
}

#[derive(Debug, Serialize)]
struct StudyReportJson<'a> {
    tool: &'static str,
    command: &'static str,
    generated_at: DateTime<Local>,
    config: &'a StudyConfig,
    truth: TruthJson,
    replicates: usize,
    mean_oracle_log_loss: f64,
    best_lambda: Option<f64>,
    summaries: &'a [LambdaSummary],
}

/// Render a `fit` run as pretty-printed JSON.
pub fn fit_report_json(
    rep: &Replicate,
    truth: &TrueModel,
    config: &StudyConfig,
    generated_at: DateTime<Local>,
) -> Result<String, AppError> {
    let fits = rep
        .fits
        .iter()
        .map(|f| FitJson {
            lambda: f.lambda,
            status: f.status,
            converged: f.converged(),
            iterations: f.iterations,
            train_objective: f.train_objective,
            intercept: f.coefficients.intercept(),
            weights: f.coefficients.weights().iter().copied().collect(),
            weight_norm_sq: f.coefficients.weight_norm_sq(),
            test: f.test,
        })
        .collect();

    let report = FitReportJson {
        tool: "rlogit",
        command: "fit",
        generated_at,
        config,
        truth: TruthJson::new(truth),
        train_prevalence: rep.train_prevalence,
        oracle: rep.oracle,
        fits,
    };

    serde_json::to_string_pretty(&report)
        .map_err(|e| AppError::new(4, format!("Failed to serialize fit report: {e}")))
}

/// Render a `study` run as pretty-printed JSON.
pub fn study_report_json(
    study: &StudyOutput,
    config: &StudyConfig,
    generated_at: DateTime<Local>,
) -> Result<String, AppError> {
    let report = StudyReportJson {
        tool: "rlogit",
        command: "study",
        generated_at,
        config,
        truth: TruthJson::new(&study.truth),
        replicates: study.replicates,
        mean_oracle_log_loss: study.mean_oracle_log_loss,
        best_lambda: study.best_lambda,
        summaries: &study.summaries,
    };

    serde_json::to_string_pretty(&report)
        .map_err(|e| AppError::new(4, format!("Failed to serialize study report: {e}")))
}
