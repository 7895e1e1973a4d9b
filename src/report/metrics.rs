//! Held-out evaluation metrics.

use nalgebra::{DMatrix, DVector};

use crate::domain::{Coefficients, HeldOutMetrics};
use crate::math::bernoulli_nll;
use crate::models::linear_predictor;

/// Mean negative log-likelihood (natural log) of labels under linear predictors.
pub fn log_loss(y: &DVector<f64>, eta: &DVector<f64>) -> f64 {
    if y.is_empty() {
        return f64::NAN;
    }
    let total: f64 = eta.iter().zip(y.iter()).map(|(&e, &yi)| bernoulli_nll(e, yi)).sum();
    total / y.len() as f64
}

/// Area under the ROC curve (Mann–Whitney U with average ranks for ties).
///
/// Returns `None` when either class is absent.
pub fn roc_auc(y: &DVector<f64>, scores: &DVector<f64>) -> Option<f64> {
    let n_pos = y.iter().filter(|&&v| v > 0.5).count();
    let n_neg = y.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Sum of (1-based, tie-averaged) ranks of the positives.
    let mut rank_sum = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            if y[idx] > 0.5 {
                rank_sum += avg_rank;
            }
        }
        i = j + 1;
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Some((rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

/// Fraction of observations classified correctly at the 0.5 threshold.
pub fn accuracy(y: &DVector<f64>, eta: &DVector<f64>) -> f64 {
    if y.is_empty() {
        return f64::NAN;
    }
    let correct = eta
        .iter()
        .zip(y.iter())
        .filter(|(e, yi)| (**e > 0.0) == (**yi > 0.5))
        .count();
    correct as f64 / y.len() as f64
}

/// All held-out metrics for one coefficient set.
pub fn evaluate(x: &DMatrix<f64>, y: &DVector<f64>, coef: &Coefficients) -> HeldOutMetrics {
    let eta = linear_predictor(x, coef);
    HeldOutMetrics {
        log_loss: log_loss(y, &eta),
        auc: roc_auc(y, &eta),
        accuracy: accuracy(y, &eta),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_loss_at_zero_is_ln_two() {
        let y = DVector::from_vec(vec![0.0, 1.0, 1.0]);
        let eta = DVector::zeros(3);
        assert!((log_loss(&y, &eta) - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn confident_correct_predictions_have_small_loss() {
        let y = DVector::from_vec(vec![0.0, 1.0]);
        let eta = DVector::from_vec(vec![-20.0, 20.0]);
        assert!(log_loss(&y, &eta) < 1e-8);
        let wrong = DVector::from_vec(vec![20.0, -20.0]);
        assert!((log_loss(&y, &wrong) - 20.0).abs() < 1e-6);
    }

    #[test]
    fn auc_perfect_inverted_and_tied() {
        let y = DVector::from_vec(vec![0.0, 0.0, 1.0, 1.0]);
        let perfect = DVector::from_vec(vec![0.1, 0.2, 0.8, 0.9]);
        assert_eq!(roc_auc(&y, &perfect), Some(1.0));

        let inverted = DVector::from_vec(vec![0.9, 0.8, 0.2, 0.1]);
        assert_eq!(roc_auc(&y, &inverted), Some(0.0));

        let tied = DVector::from_element(4, 0.3);
        assert_eq!(roc_auc(&y, &tied), Some(0.5));
    }

    #[test]
    fn auc_counts_pairs() {
        // Pairs (pos, neg): (0.4 vs 0.1) win, (0.4 vs 0.5) loss,
        // (0.7 vs 0.1) win, (0.7 vs 0.5) win -> 3/4.
        let y = DVector::from_vec(vec![0.0, 1.0, 0.0, 1.0]);
        let s = DVector::from_vec(vec![0.1, 0.4, 0.5, 0.7]);
        assert!((roc_auc(&y, &s).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn auc_undefined_for_single_class() {
        let y = DVector::from_element(3, 1.0);
        let s = DVector::from_vec(vec![0.1, 0.2, 0.3]);
        assert_eq!(roc_auc(&y, &s), None);
    }

    #[test]
    fn accuracy_uses_zero_logit_threshold() {
        let y = DVector::from_vec(vec![0.0, 1.0, 1.0, 0.0]);
        let eta = DVector::from_vec(vec![-1.0, 2.0, -0.5, 0.3]);
        assert!((accuracy(&y, &eta) - 0.5).abs() < 1e-12);
    }
}
