//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting and study code stays clean and testable
//! - output changes are localized

use chrono::{DateTime, Local};

use crate::domain::{StudyConfig, TrueModel};
use crate::study::{Replicate, ReplicateFit, StudyOutput};

/// Format the `fit` report: run header plus one row per λ.
pub fn format_fit_report(rep: &Replicate, truth: &TrueModel, config: &StudyConfig) -> String {
    let mut out = String::new();

    out.push_str("=== rlogit - ridge logistic fit ===\n");
    out.push_str(&format_run_header(truth, config));
    out.push_str(&format!(
        "Train prevalence: {:.3} | oracle test log-loss={:.4} AUC={}\n",
        rep.train_prevalence,
        rep.oracle.log_loss,
        fmt_opt(rep.oracle.auc, 4),
    ));

    out.push('\n');
    out.push_str(
        format!(
            "{:>10} {:<14} {:>7} {:>12} {:>10} {:>10} {:>10} {:>7}\n",
            "lambda", "status", "iters", "objective", "|b|^2", "b0", "logloss", "auc"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:->10} {:-<14} {:->7} {:->12} {:->10} {:->10} {:->10} {:->7}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for f in &rep.fits {
        let flag = if f.converged() { " " } else { "!" };
        out.push_str(
            format!(
                "{:>10} {:<14} {:>7} {:>12.6} {:>10.4} {:>10.4} {:>10.4} {:>7}{flag}\n",
                fmt_lambda(f.lambda),
                truncate(&f.status.to_string(), 14),
                f.iterations,
                f.train_objective,
                f.coefficients.weight_norm_sq(),
                f.coefficients.intercept(),
                f.test.log_loss,
                fmt_opt(f.test.auc, 4),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    let failed = rep.fits.iter().filter(|f| !f.converged()).count();
    if failed > 0 {
        out.push_str(&format!(
            "\n{failed} fit(s) did not converge (marked !); their estimates are partial.\n"
        ));
    }

    if config.show_coefficients > 0 {
        out.push('\n');
        out.push_str(&format_coefficient_comparison(truth, &rep.fits, config.show_coefficients));
    }

    out
}

/// First `k` true weights next to each λ's estimate.
pub fn format_coefficient_comparison(truth: &TrueModel, fits: &[ReplicateFit], k: usize) -> String {
    let k = k.min(truth.coefficients.n_features());
    let mut out = String::new();

    out.push_str(&format!("Leading coefficients (first {k}, raw scale):\n"));
    out.push_str(&format!("{:>6} {:>10}", "j", "true"));
    for f in fits {
        out.push_str(&format!(" {:>10}", fmt_lambda(f.lambda)));
    }
    out.push('\n');

    out.push_str(&format!("{:>6} {:>10.4}", "b0", truth.coefficients.intercept()));
    for f in fits {
        out.push_str(&format!(" {:>10.4}", f.coefficients.intercept()));
    }
    out.push('\n');

    for j in 0..k {
        out.push_str(&format!("{:>6} {:>10.4}", j + 1, truth.coefficients.weights()[j]));
        for f in fits {
            out.push_str(&format!(" {:>10.4}", f.coefficients.weights()[j]));
        }
        out.push('\n');
    }

    out
}

/// Format the `study` summary: run header plus one bias-variance row per λ.
pub fn format_study_summary(
    study: &StudyOutput,
    config: &StudyConfig,
    generated_at: DateTime<Local>,
) -> String {
    let mut out = String::new();

    out.push_str("=== rlogit - ridge logistic bias-variance study ===\n");
    out.push_str(&format!("Generated: {}\n", generated_at.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&format_run_header(&study.truth, config));
    out.push_str(&format!(
        "Replicates: {} | oracle test log-loss={:.4}\n",
        study.replicates, study.mean_oracle_log_loss,
    ));

    out.push('\n');
    out.push_str(
        format!(
            "{:>10} {:>10} {:>10} {:>10} {:>10} {:>18} {:>7} {:>6}\n",
            "lambda", "bias^2", "variance", "mse", "|b|^2", "logloss (sd)", "auc", "fail"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:->10} {:->10} {:->10} {:->10} {:->10} {:->18} {:->7} {:->6}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for s in &study.summaries {
        let chosen = if study.best_lambda == Some(s.lambda) { "*" } else { " " };
        out.push_str(
            format!(
                "{:>10} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>18} {:>7.4} {:>6}{chosen}\n",
                fmt_lambda(s.lambda),
                s.bias_sq,
                s.variance,
                s.coef_mse,
                s.mean_norm_sq,
                format!("{:.4} ({:.4})", s.mean_test_log_loss, s.sd_test_log_loss),
                s.mean_test_auc,
                s.failures,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out.push('\n');
    match study.best_lambda {
        Some(lambda) => out.push_str(&format!(
            "Best held-out log-loss at lambda={} (marked *).\n",
            fmt_lambda(lambda)
        )),
        None => out.push_str("No lambda produced a converged fit.\n"),
    }
    let failures = study.total_failures();
    if failures > 0 {
        out.push_str(&format!(
            "{failures} non-converged fit(s) were excluded from the aggregates.\n"
        ));
    }

    out
}

fn format_run_header(truth: &TrueModel, config: &StudyConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Design: p={} | n_train={} | n_test={} | standardize={}\n",
        config.p, config.n_train, config.n_test, config.standardize,
    ));
    out.push_str(&format!(
        "Truth: signal={} | b0={} | |b*|^2={:.4} | seed={}\n",
        config.signal,
        truth.coefficients.intercept(),
        truth.coefficients.weight_norm_sq(),
        config.seed,
    ));
    out.push_str(&format!(
        "Solver: {} | max_iter={} | tol={:e}\n",
        config.solver.display_name(),
        config.max_iter,
        config.grad_tol,
    ));
    out.push_str(&format!("Lambdas: {}\n", fmt_vec(&config.lambdas)));
    out
}

fn fmt_lambda(lambda: f64) -> String {
    if lambda == 0.0 {
        "0".to_string()
    } else if lambda >= 0.01 && lambda < 1e4 {
        format!("{lambda}")
    } else {
        format!("{lambda:.2e}")
    }
}

fn fmt_opt(v: Option<f64>, digits: usize) -> String {
    match v {
        Some(x) => format!("{x:.digits$}"),
        None => "n/a".to_string(),
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| fmt_lambda(*x)).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coefficients, FitStatus, HeldOutMetrics, LambdaSummary};
    use nalgebra::DVector;

    fn truth() -> TrueModel {
        TrueModel {
            coefficients: Coefficients::new(0.25, DVector::from_vec(vec![1.0, -2.0, 0.5])),
            weight_sd: 1.0,
        }
    }

    fn replicate_fit(lambda: f64, status: FitStatus) -> ReplicateFit {
        ReplicateFit {
            lambda,
            status,
            iterations: 12,
            train_objective: 1.2,
            coefficients: Coefficients::new(0.2, DVector::from_vec(vec![0.9, -1.8, 0.4])),
            test: HeldOutMetrics {
                log_loss: 0.55,
                auc: Some(0.81),
                accuracy: 0.74,
            },
        }
    }

    fn summary(lambda: f64, loss: f64, failures: usize) -> LambdaSummary {
        LambdaSummary {
            lambda,
            converged: 10 - failures,
            failures,
            mean_norm_sq: 4.0,
            bias_sq: 0.1,
            variance: 0.5,
            coef_mse: 0.6,
            mean_train_objective: 1.1,
            mean_test_log_loss: loss,
            sd_test_log_loss: 0.02,
            mean_test_auc: 0.8,
            mean_test_accuracy: 0.7,
            mean_iterations: 40.0,
        }
    }

    #[test]
    fn fit_report_lists_every_lambda_and_flags_failures() {
        let config = StudyConfig {
            p: 3,
            lambdas: vec![0.0, 0.1],
            show_coefficients: 2,
            ..StudyConfig::default()
        };
        let rep = Replicate {
            index: 0,
            train_prevalence: 0.5,
            fits: vec![
                replicate_fit(0.0, FitStatus::Separated),
                replicate_fit(0.1, FitStatus::Converged),
            ],
            oracle: HeldOutMetrics {
                log_loss: 0.5,
                auc: None,
                accuracy: 0.75,
            },
        };

        let text = format_fit_report(&rep, &truth(), &config);
        assert!(text.contains("perfect separ."));
        assert!(text.contains("converged"));
        assert!(text.contains("1 fit(s) did not converge"));
        assert!(text.contains("AUC=n/a"));
        assert!(text.contains("Leading coefficients (first 2"));
        assert!(text.lines().all(|l| l == l.trim_end()));
    }

    #[test]
    fn study_summary_marks_best_lambda() {
        let study = StudyOutput {
            truth: truth(),
            summaries: vec![summary(0.0, 0.70, 0), summary(0.1, 0.60, 2)],
            best_lambda: Some(0.1),
            mean_oracle_log_loss: 0.55,
            replicates: 10,
        };
        let config = StudyConfig::default();
        let text = format_study_summary(&study, &config, Local::now());

        let best_row = text
            .lines()
            .find(|l| l.trim_start().starts_with("0.1 "))
            .unwrap();
        assert!(best_row.ends_with('*'));
        assert!(text.contains("Best held-out log-loss at lambda=0.1"));
        assert!(text.contains("2 non-converged fit(s)"));
    }

    #[test]
    fn lambda_formatting() {
        assert_eq!(fmt_lambda(0.0), "0");
        assert_eq!(fmt_lambda(0.1), "0.1");
        assert_eq!(fmt_lambda(0.001), "1.00e-3");
        assert_eq!(truncate("abcdef", 4), "abc.");
    }
}
