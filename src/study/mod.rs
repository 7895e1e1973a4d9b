//! The repeated-simulation bias-variance experiment.
//!
//! One true coefficient vector is drawn per run. Each replicate then:
//!
//! 1. draws an independent train and test set from that truth
//! 2. standardizes with training statistics
//! 3. fits the whole λ grid as a warm-started path
//! 4. maps every fit back to the raw feature scale and scores it on the test set
//!
//! Replicates run on the rayon pool and are collected in index order, so the
//! aggregates do not depend on the number of threads.

use nalgebra::DVector;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::data::{draw_true_model, replicate_seed, simulate, truth_seed};
use crate::domain::{
    Coefficients, FitStatus, HeldOutMetrics, LambdaSummary, StudyConfig, TrueModel,
};
use crate::error::AppError;
use crate::fit::fit_path;
use crate::math::Standardizer;
use crate::report::metrics::evaluate;

/// One λ of one replicate.
#[derive(Debug, Clone)]
pub struct ReplicateFit {
    pub lambda: f64,
    pub status: FitStatus,
    pub iterations: usize,
    /// Penalized objective on the (standardized) training design.
    pub train_objective: f64,
    /// Coefficients on the raw feature scale.
    pub coefficients: Coefficients,
    pub test: HeldOutMetrics,
}

impl ReplicateFit {
    pub fn converged(&self) -> bool {
        self.status == FitStatus::Converged
    }
}

/// Everything computed for one simulated train/test draw.
#[derive(Debug, Clone)]
pub struct Replicate {
    pub index: usize,
    pub train_prevalence: f64,
    /// Fits in λ-grid order.
    pub fits: Vec<ReplicateFit>,
    /// The true coefficients scored on the same test set.
    pub oracle: HeldOutMetrics,
}

/// Aggregated output of a study run.
#[derive(Debug, Clone)]
pub struct StudyOutput {
    pub truth: TrueModel,
    pub summaries: Vec<LambdaSummary>,
    /// λ with the lowest mean held-out log-loss (among λ with converged fits).
    pub best_lambda: Option<f64>,
    pub mean_oracle_log_loss: f64,
    pub replicates: usize,
}

impl StudyOutput {
    pub fn total_failures(&self) -> usize {
        self.summaries.iter().map(|s| s.failures).sum()
    }
}

/// Draw the run's true model from the configured seed.
pub fn true_model(config: &StudyConfig) -> Result<TrueModel, AppError> {
    let mut rng = StdRng::seed_from_u64(truth_seed(config));
    draw_true_model(config.p, config.signal, config.intercept, &mut rng)
}

/// Run one replicate: simulate, standardize, fit the λ path, evaluate.
pub fn run_replicate(
    config: &StudyConfig,
    truth: &TrueModel,
    index: usize,
) -> Result<Replicate, AppError> {
    validate_config(config)?;

    let mut rng = StdRng::seed_from_u64(replicate_seed(config, index));
    let train = simulate(truth, config.n_train, &mut rng)?;
    let test = simulate(truth, config.n_test, &mut rng)?;

    let scaler = if config.standardize {
        Standardizer::fit(&train.x)?
    } else {
        Standardizer::identity(train.p())
    };
    let x_train = scaler.transform(&train.x)?;

    let path = fit_path(&x_train, &train.y, &config.lambdas, &config.fit_options())?;

    let mut fits = Vec::with_capacity(path.len());
    for fit in path {
        let coefficients = scaler.to_raw_scale(&fit.coefficients)?;
        let test_metrics = evaluate(&test.x, &test.y, &coefficients);
        fits.push(ReplicateFit {
            lambda: fit.lambda,
            status: fit.status,
            iterations: fit.iterations,
            train_objective: fit.objective,
            coefficients,
            test: test_metrics,
        });
    }

    log::debug!(
        "replicate {index}: prevalence={:.3}, {}/{} fits converged",
        train.prevalence(),
        fits.iter().filter(|f| f.converged()).count(),
        fits.len(),
    );

    Ok(Replicate {
        index,
        train_prevalence: train.prevalence(),
        fits,
        oracle: evaluate(&test.x, &test.y, &truth.coefficients),
    })
}

/// Run the full replicated experiment and aggregate per λ.
pub fn run_study(config: &StudyConfig) -> Result<StudyOutput, AppError> {
    validate_config(config)?;
    if config.replicates == 0 {
        return Err(AppError::new(2, "Replicate count must be > 0."));
    }

    let truth = true_model(config)?;
    log::info!(
        "study: {} replicates, p={}, n_train={}, n_test={}, {} lambdas, solver={}",
        config.replicates,
        config.p,
        config.n_train,
        config.n_test,
        config.lambdas.len(),
        config.solver.display_name(),
    );

    let replicates: Vec<Replicate> = (0..config.replicates)
        .into_par_iter()
        .map(|index| run_replicate(config, &truth, index))
        .collect::<Result<_, _>>()?;

    for rep in &replicates {
        for fit in rep.fits.iter().filter(|f| !f.converged()) {
            log::warn!(
                "replicate {} λ={}: {} after {} iterations; excluded from aggregates",
                rep.index,
                fit.lambda,
                fit.status,
                fit.iterations,
            );
        }
    }

    let summaries: Vec<LambdaSummary> = config
        .lambdas
        .iter()
        .enumerate()
        .map(|(k, &lambda)| {
            let fits: Vec<&ReplicateFit> = replicates.iter().map(|r| &r.fits[k]).collect();
            summarize_lambda(lambda, &truth, &fits)
        })
        .collect();

    let mean_oracle_log_loss =
        replicates.iter().map(|r| r.oracle.log_loss).sum::<f64>() / replicates.len() as f64;
    let best_lambda = best_lambda(&summaries);

    log::info!(
        "study finished: best λ={}, {} non-converged fits",
        best_lambda.map_or_else(|| "n/a".to_string(), |l| l.to_string()),
        summaries.iter().map(|s| s.failures).sum::<usize>(),
    );

    Ok(StudyOutput {
        truth,
        summaries,
        best_lambda,
        mean_oracle_log_loss,
        replicates: replicates.len(),
    })
}

/// Aggregate one λ across replicates, using converged fits only.
///
/// Bias and variance are computed over feature weights (the intercept is
/// excluded, matching the penalty).
pub fn summarize_lambda(lambda: f64, truth: &TrueModel, fits: &[&ReplicateFit]) -> LambdaSummary {
    let ok: Vec<&ReplicateFit> = fits.iter().copied().filter(|f| f.converged()).collect();
    let failures = fits.len() - ok.len();

    if ok.is_empty() {
        return LambdaSummary {
            lambda,
            converged: 0,
            failures,
            mean_norm_sq: f64::NAN,
            bias_sq: f64::NAN,
            variance: f64::NAN,
            coef_mse: f64::NAN,
            mean_train_objective: f64::NAN,
            mean_test_log_loss: f64::NAN,
            sd_test_log_loss: f64::NAN,
            mean_test_auc: f64::NAN,
            mean_test_accuracy: f64::NAN,
            mean_iterations: f64::NAN,
        };
    }

    let m = ok.len() as f64;
    let p = truth.coefficients.n_features();

    let mut mean_weights = DVector::zeros(p);
    for f in &ok {
        mean_weights += f.coefficients.weights();
    }
    mean_weights /= m;

    let bias_sq = (&mean_weights - truth.coefficients.weights()).norm_squared();
    let variance = ok
        .iter()
        .map(|f| (f.coefficients.weights() - &mean_weights).norm_squared())
        .sum::<f64>()
        / m;

    let losses: Vec<f64> = ok.iter().map(|f| f.test.log_loss).collect();
    let mean_loss = mean(&losses);
    let sd_loss = sample_sd(&losses, mean_loss);

    let aucs: Vec<f64> = ok.iter().filter_map(|f| f.test.auc).collect();
    let mean_auc = if aucs.is_empty() { f64::NAN } else { mean(&aucs) };

    LambdaSummary {
        lambda,
        converged: ok.len(),
        failures,
        mean_norm_sq: ok.iter().map(|f| f.coefficients.weight_norm_sq()).sum::<f64>() / m,
        bias_sq,
        variance,
        coef_mse: bias_sq + variance,
        mean_train_objective: ok.iter().map(|f| f.train_objective).sum::<f64>() / m,
        mean_test_log_loss: mean_loss,
        sd_test_log_loss: sd_loss,
        mean_test_auc: mean_auc,
        mean_test_accuracy: ok.iter().map(|f| f.test.accuracy).sum::<f64>() / m,
        mean_iterations: ok.iter().map(|f| f.iterations as f64).sum::<f64>() / m,
    }
}

/// λ with the lowest finite mean held-out log-loss.
pub fn best_lambda(summaries: &[LambdaSummary]) -> Option<f64> {
    summaries
        .iter()
        .filter(|s| s.converged > 0 && s.mean_test_log_loss.is_finite())
        .min_by(|a, b| {
            a.mean_test_log_loss
                .partial_cmp(&b.mean_test_log_loss)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|s| s.lambda)
}

fn validate_config(config: &StudyConfig) -> Result<(), AppError> {
    if config.p == 0 {
        return Err(AppError::new(2, "Feature count must be > 0."));
    }
    if config.n_train < 2 {
        return Err(AppError::new(
            3,
            format!("Need at least 2 training observations, got {}.", config.n_train),
        ));
    }
    if config.n_test == 0 {
        return Err(AppError::new(3, "Need at least 1 test observation."));
    }
    if config.lambdas.is_empty() {
        return Err(AppError::new(2, "At least one lambda is required."));
    }
    Ok(())
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_sd(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (ss / (values.len() as f64 - 1.0)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SolverKind;

    fn small_config() -> StudyConfig {
        StudyConfig {
            p: 5,
            n_train: 200,
            n_test: 500,
            signal: 1.5,
            replicates: 6,
            lambdas: vec![0.0, 0.01, 0.1, 1.0],
            solver: SolverKind::Newton,
            grad_tol: 1e-9,
            ..StudyConfig::default()
        }
    }

    #[test]
    fn study_produces_one_summary_per_lambda() {
        let config = small_config();
        let out = run_study(&config).unwrap();
        assert_eq!(out.summaries.len(), config.lambdas.len());
        assert_eq!(out.replicates, config.replicates);
        assert_eq!(out.total_failures(), 0);
        for (s, &lambda) in out.summaries.iter().zip(&config.lambdas) {
            assert_eq!(s.lambda, lambda);
            assert_eq!(s.converged, config.replicates);
            assert!((s.coef_mse - (s.bias_sq + s.variance)).abs() < 1e-12);
            assert!(s.mean_test_auc > 0.5 && s.mean_test_auc <= 1.0);
        }
        assert!(out.best_lambda.is_some());
        assert!(out.mean_oracle_log_loss.is_finite());
    }

    #[test]
    fn shrinkage_is_monotone_across_lambdas() {
        let out = run_study(&small_config()).unwrap();
        for w in out.summaries.windows(2) {
            assert!(
                w[1].mean_norm_sq <= w[0].mean_norm_sq + 1e-8,
                "λ={} |β|²={} > λ={} |β|²={}",
                w[1].lambda,
                w[1].mean_norm_sq,
                w[0].lambda,
                w[0].mean_norm_sq,
            );
        }
        // Heavy penalty trades variance for bias.
        let first = &out.summaries[0];
        let last = &out.summaries[out.summaries.len() - 1];
        assert!(last.variance < first.variance);
        assert!(last.bias_sq > first.bias_sq);
    }

    #[test]
    fn study_is_reproducible() {
        let config = small_config();
        let a = run_study(&config).unwrap();
        let b = run_study(&config).unwrap();
        for (x, y) in a.summaries.iter().zip(&b.summaries) {
            assert_eq!(x.bias_sq, y.bias_sq);
            assert_eq!(x.variance, y.variance);
            assert_eq!(x.mean_test_log_loss, y.mean_test_log_loss);
        }
    }

    #[test]
    fn non_converged_fits_are_excluded() {
        let truth = TrueModel {
            coefficients: Coefficients::new(0.0, DVector::from_vec(vec![1.0])),
            weight_sd: 1.0,
        };
        let metrics = HeldOutMetrics {
            log_loss: 0.5,
            auc: Some(0.7),
            accuracy: 0.8,
        };
        let good = ReplicateFit {
            lambda: 0.1,
            status: FitStatus::Converged,
            iterations: 10,
            train_objective: 1.0,
            coefficients: Coefficients::new(0.0, DVector::from_vec(vec![0.5])),
            test: metrics,
        };
        let bad = ReplicateFit {
            status: FitStatus::MaxIterations,
            coefficients: Coefficients::new(0.0, DVector::from_vec(vec![100.0])),
            ..good.clone()
        };

        let s = summarize_lambda(0.1, &truth, &[&good, &bad]);
        assert_eq!(s.converged, 1);
        assert_eq!(s.failures, 1);
        assert!((s.bias_sq - 0.25).abs() < 1e-12);
        assert_eq!(s.variance, 0.0);
        assert_eq!(s.sd_test_log_loss, 0.0);

        let none = summarize_lambda(0.1, &truth, &[&bad]);
        assert_eq!(none.converged, 0);
        assert!(none.bias_sq.is_nan());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = StudyConfig {
            n_train: 1,
            ..small_config()
        };
        assert_eq!(run_study(&config).unwrap_err().exit_code(), 3);

        let config = StudyConfig {
            replicates: 0,
            ..small_config()
        };
        assert_eq!(run_study(&config).unwrap_err().exit_code(), 2);
    }
}
