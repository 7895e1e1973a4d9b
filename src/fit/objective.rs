//! The ridge-penalized logistic objective.
//!
//! ```text
//! L(β₀, β) = −(2/n) Σᵢ [yᵢ log h(ηᵢ) + (1−yᵢ) log(1 − h(ηᵢ))] + λ Σⱼ βⱼ²
//! ηᵢ = β₀ + xᵢ·β
//! ```
//!
//! Parameters are handled as one vector `θ = [β₀, β₁ … β_p]`. The intercept
//! `θ[0]` never enters the penalty, so its gradient component is the plain
//! deviance gradient for every λ.

use nalgebra::{DMatrix, DVector};

use crate::math::{augmented_gram_max_eigenvalue, bernoulli_nll, sigmoid};

/// Power iterations used to bound the gradient's Lipschitz constant.
const POWER_ITERS: usize = 50;

/// Borrowed view of a validated fitting problem.
#[derive(Debug, Clone, Copy)]
pub struct PenalizedObjective<'a> {
    x: &'a DMatrix<f64>,
    y: &'a DVector<f64>,
    lambda: f64,
}

impl<'a> PenalizedObjective<'a> {
    /// Inputs are assumed validated (shapes agree, labels binary, λ ≥ 0).
    pub fn new(x: &'a DMatrix<f64>, y: &'a DVector<f64>, lambda: f64) -> Self {
        Self { x, y, lambda }
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn n_obs(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Length of θ (features plus intercept).
    pub fn dim(&self) -> usize {
        self.n_features() + 1
    }

    pub fn linear_predictor(&self, theta: &DVector<f64>) -> DVector<f64> {
        let mut eta = self.x * theta.rows(1, self.n_features());
        eta.add_scalar_mut(theta[0]);
        eta
    }

    /// `−(2/n)·loglik`, the unpenalized part of the objective.
    pub fn deviance_term(&self, theta: &DVector<f64>) -> f64 {
        let eta = self.linear_predictor(theta);
        self.deviance_from_eta(&eta)
    }

    /// `λ Σⱼ βⱼ²`, excluding the intercept.
    pub fn penalty_term(&self, theta: &DVector<f64>) -> f64 {
        self.lambda * theta.rows(1, self.n_features()).norm_squared()
    }

    pub fn value(&self, theta: &DVector<f64>) -> f64 {
        self.deviance_term(theta) + self.penalty_term(theta)
    }

    pub fn gradient(&self, theta: &DVector<f64>) -> DVector<f64> {
        self.value_and_gradient(theta).1
    }

    /// Objective and gradient from a single pass over the data.
    pub fn value_and_gradient(&self, theta: &DVector<f64>) -> (f64, DVector<f64>) {
        let eta = self.linear_predictor(theta);
        let value = self.deviance_from_eta(&eta) + self.penalty_term(theta);
        let grad = self.gradient_from_eta(theta, &eta);
        (value, grad)
    }

    /// Penalized Hessian `(2/n) X̃ᵀ W X̃ + 2λ·diag(0, 1, …, 1)`.
    pub fn hessian(&self, theta: &DVector<f64>) -> DMatrix<f64> {
        let n = self.n_obs();
        let p = self.n_features();
        let scale = 2.0 / n as f64;
        let eta = self.linear_predictor(theta);
        let w = eta.map(|e| {
            let h = sigmoid(e);
            scale * h * (1.0 - h)
        });

        let mut xw = self.x.clone();
        for mut col in xw.column_iter_mut() {
            col.component_mul_assign(&w);
        }

        let mut hess = DMatrix::zeros(p + 1, p + 1);
        hess[(0, 0)] = w.sum();
        for j in 0..p {
            let s = xw.column(j).sum();
            hess[(0, j + 1)] = s;
            hess[(j + 1, 0)] = s;
        }
        hess.view_mut((1, 1), (p, p)).copy_from(&self.x.tr_mul(&xw));
        for j in 1..=p {
            hess[(j, j)] += 2.0 * self.lambda;
        }
        hess
    }

    /// Upper estimate of the gradient's Lipschitz constant:
    /// `σ_max([1 | X])² / (2n) + 2λ` (since `h' ≤ 1/4`).
    pub fn lipschitz_estimate(&self) -> f64 {
        let n = self.n_obs().max(1) as f64;
        let eig = augmented_gram_max_eigenvalue(self.x, POWER_ITERS);
        eig / (2.0 * n) + 2.0 * self.lambda
    }

    /// True when every observation lies strictly on its label's side of `η = 0`.
    pub fn separates(&self, theta: &DVector<f64>) -> bool {
        let eta = self.linear_predictor(theta);
        eta.iter()
            .zip(self.y.iter())
            .all(|(&e, &y)| if y > 0.5 { e > 0.0 } else { e < 0.0 })
    }

    fn deviance_from_eta(&self, eta: &DVector<f64>) -> f64 {
        let n = self.n_obs() as f64;
        let nll: f64 = eta
            .iter()
            .zip(self.y.iter())
            .map(|(&e, &y)| bernoulli_nll(e, y))
            .sum();
        2.0 * nll / n
    }

    fn gradient_from_eta(&self, theta: &DVector<f64>, eta: &DVector<f64>) -> DVector<f64> {
        let p = self.n_features();
        let scale = 2.0 / self.n_obs() as f64;

        // r_i = h(η_i) − y_i
        let r = eta.zip_map(self.y, |e, y| sigmoid(e) - y);

        let mut grad = DVector::zeros(p + 1);
        grad[0] = scale * r.sum();
        let gx = self.x.tr_mul(&r) * scale;
        for j in 0..p {
            grad[j + 1] = gx[j] + 2.0 * self.lambda * theta[j + 1];
        }
        grad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_problem() -> (DMatrix<f64>, DVector<f64>) {
        let x = DMatrix::from_row_slice(
            6,
            2,
            &[0.5, -1.0, 1.2, 0.3, -0.7, 0.8, 2.0, -0.4, -1.5, -1.1, 0.1, 1.9],
        );
        let y = DVector::from_vec(vec![1.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
        (x, y)
    }

    #[test]
    fn value_at_zero_is_two_log_two() {
        let (x, y) = toy_problem();
        let obj = PenalizedObjective::new(&x, &y, 3.0);
        let theta = DVector::zeros(3);
        assert!((obj.value(&theta) - 2.0 * std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let (x, y) = toy_problem();
        let obj = PenalizedObjective::new(&x, &y, 0.25);
        let theta = DVector::from_vec(vec![0.2, -0.6, 0.9]);
        let grad = obj.gradient(&theta);

        let h = 1e-6;
        for k in 0..theta.len() {
            let mut up = theta.clone();
            let mut dn = theta.clone();
            up[k] += h;
            dn[k] -= h;
            let fd = (obj.value(&up) - obj.value(&dn)) / (2.0 * h);
            assert!((fd - grad[k]).abs() < 1e-7, "k={k}: fd={fd} grad={}", grad[k]);
        }
    }

    #[test]
    fn intercept_gradient_excludes_penalty() {
        let (x, y) = toy_problem();
        let theta = DVector::from_vec(vec![0.4, 1.3, -2.1]);
        let g0 = PenalizedObjective::new(&x, &y, 0.0).gradient(&theta);
        let g5 = PenalizedObjective::new(&x, &y, 5.0).gradient(&theta);

        assert_eq!(g0[0], g5[0]);
        for j in 1..theta.len() {
            assert!((g5[j] - g0[j] - 2.0 * 5.0 * theta[j]).abs() < 1e-12);
        }
    }

    #[test]
    fn hessian_matches_finite_differences_of_gradient() {
        let (x, y) = toy_problem();
        let obj = PenalizedObjective::new(&x, &y, 0.5);
        let theta = DVector::from_vec(vec![-0.1, 0.7, 0.2]);
        let hess = obj.hessian(&theta);

        let h = 1e-6;
        for k in 0..theta.len() {
            let mut up = theta.clone();
            let mut dn = theta.clone();
            up[k] += h;
            dn[k] -= h;
            let col = (obj.gradient(&up) - obj.gradient(&dn)) / (2.0 * h);
            for j in 0..theta.len() {
                assert!((col[j] - hess[(j, k)]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn lipschitz_estimate_includes_penalty() {
        let (x, y) = toy_problem();
        let l0 = PenalizedObjective::new(&x, &y, 0.0).lipschitz_estimate();
        let l1 = PenalizedObjective::new(&x, &y, 1.0).lipschitz_estimate();
        assert!(l0 > 0.0);
        assert!((l1 - l0 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn separates_detects_strict_sign_agreement() {
        let x = DMatrix::from_column_slice(4, 1, &[-2.0, -1.0, 1.0, 2.0]);
        let y = DVector::from_vec(vec![0.0, 0.0, 1.0, 1.0]);
        let obj = PenalizedObjective::new(&x, &y, 0.0);
        assert!(!obj.separates(&DVector::zeros(2)));
        assert!(obj.separates(&DVector::from_vec(vec![0.0, 1.0])));
        assert!(!obj.separates(&DVector::from_vec(vec![0.0, -1.0])));
    }
}
