//! Synthetic logistic-regression data.
//!
//! Features are i.i.d. standard normal and labels are Bernoulli draws from the
//! logistic model with known coefficients, so every estimate can be compared
//! against the truth.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use nalgebra::{DMatrix, DVector};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Normal, StandardNormal};

use crate::domain::{Coefficients, Dataset, StudyConfig, TrueModel};
use crate::error::AppError;
use crate::math::sigmoid;
use crate::models::linear_predictor;

/// Draw the true coefficients: `βⱼ* ~ N(0, signal²/p)`, fixed intercept.
///
/// With standard-normal features this gives `Var(x·β*) ≈ signal²`.
pub fn draw_true_model(
    p: usize,
    signal: f64,
    intercept: f64,
    rng: &mut StdRng,
) -> Result<TrueModel, AppError> {
    if p == 0 {
        return Err(AppError::new(2, "Feature count must be > 0."));
    }
    if !(signal.is_finite() && signal >= 0.0) {
        return Err(AppError::new(2, format!("Invalid signal strength {signal}.")));
    }
    if !intercept.is_finite() {
        return Err(AppError::new(2, format!("Invalid intercept {intercept}.")));
    }

    let weight_sd = signal / (p as f64).sqrt();
    let weights = if weight_sd > 0.0 {
        let normal = Normal::new(0.0, weight_sd)
            .map_err(|e| AppError::new(4, format!("Coefficient distribution error: {e}")))?;
        DVector::from_fn(p, |_, _| normal.sample(rng))
    } else {
        DVector::zeros(p)
    };

    Ok(TrueModel {
        coefficients: Coefficients::new(intercept, weights),
        weight_sd,
    })
}

/// Sample `n` observations from the true model.
pub fn simulate(truth: &TrueModel, n: usize, rng: &mut StdRng) -> Result<Dataset, AppError> {
    if n == 0 {
        return Err(AppError::new(2, "Sample size must be > 0."));
    }

    let p = truth.coefficients.n_features();
    let x = DMatrix::from_fn(n, p, |_, _| rng.sample::<f64, _>(StandardNormal));
    let eta = linear_predictor(&x, &truth.coefficients);
    let y = eta.map(|e| if rng.r#gen::<f64>() < sigmoid(e) { 1.0 } else { 0.0 });

    Ok(Dataset { x, y })
}

/// Seed for the true coefficients of a run.
pub fn truth_seed(config: &StudyConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    "truth".hash(&mut hasher);
    config.seed.hash(&mut hasher);
    config.p.hash(&mut hasher);
    config.signal.to_bits().hash(&mut hasher);
    config.intercept.to_bits().hash(&mut hasher);
    hasher.finish()
}

/// Independent seed for replicate `index` of a run.
pub fn replicate_seed(config: &StudyConfig, index: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    "replicate".hash(&mut hasher);
    config.seed.hash(&mut hasher);
    index.hash(&mut hasher);
    config.n_train.hash(&mut hasher);
    config.n_test.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn true_model_has_requested_shape_and_scale() {
        let mut rng = StdRng::seed_from_u64(1);
        let truth = draw_true_model(400, 2.0, -0.5, &mut rng).unwrap();
        assert_eq!(truth.coefficients.n_features(), 400);
        assert_eq!(truth.coefficients.intercept(), -0.5);
        assert!((truth.weight_sd - 0.1).abs() < 1e-12);

        // ‖β*‖² ≈ signal² = 4 for large p.
        let norm_sq = truth.coefficients.weight_norm_sq();
        assert!(norm_sq > 3.0 && norm_sq < 5.0, "norm_sq = {norm_sq}");
    }

    #[test]
    fn zero_signal_gives_zero_weights() {
        let mut rng = StdRng::seed_from_u64(2);
        let truth = draw_true_model(5, 0.0, 0.0, &mut rng).unwrap();
        assert_eq!(truth.coefficients.weight_norm_sq(), 0.0);
    }

    #[test]
    fn simulate_produces_binary_labels_with_expected_prevalence() {
        let mut rng = StdRng::seed_from_u64(3);
        let truth = TrueModel {
            coefficients: Coefficients::new(1.0, DVector::zeros(3)),
            weight_sd: 0.0,
        };
        let data = simulate(&truth, 4000, &mut rng).unwrap();
        assert_eq!(data.n(), 4000);
        assert_eq!(data.p(), 3);
        assert!(data.y.iter().all(|&v| v == 0.0 || v == 1.0));

        // P(y=1) = h(1) ≈ 0.731
        assert!((data.prevalence() - sigmoid(1.0)).abs() < 0.03);
    }

    #[test]
    fn same_seed_reproduces_data() {
        let truth = TrueModel {
            coefficients: Coefficients::new(0.0, DVector::from_vec(vec![0.5, -0.5])),
            weight_sd: 0.5,
        };
        let a = simulate(&truth, 50, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = simulate(&truth, 50, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.x, b.x);
        assert_eq!(a.y, b.y);
    }

    #[test]
    fn replicate_seeds_differ() {
        let config = StudyConfig::default();
        assert_ne!(replicate_seed(&config, 0), replicate_seed(&config, 1));
        assert_ne!(truth_seed(&config), replicate_seed(&config, 0));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut rng = StdRng::seed_from_u64(4);
        assert!(draw_true_model(0, 1.0, 0.0, &mut rng).is_err());
        assert!(draw_true_model(3, -1.0, 0.0, &mut rng).is_err());
        let truth = draw_true_model(3, 1.0, 0.0, &mut rng).unwrap();
        assert!(simulate(&truth, 0, &mut rng).is_err());
    }
}
