//! Small dense linear-algebra helpers.
//!
//! The Newton solver repeatedly solves `H d = g` for the penalized Hessian `H`,
//! which is symmetric positive definite for λ > 0 but can be numerically
//! singular at λ = 0 when the fit drifts towards separation.
//!
//! Implementation choices:
//! - Cholesky first: cheapest, and exact for well-conditioned SPD systems.
//! - SVD fallback with progressively looser tolerances for near-singular systems.
//! - `None` when neither produces a finite solution; the caller decides what to do.

use nalgebra::{DMatrix, DVector};

/// Solve a symmetric positive (semi-)definite system.
pub fn solve_spd(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    if let Some(chol) = a.clone().cholesky() {
        let x = chol.solve(b);
        if x.iter().all(|v| v.is_finite()) {
            return Some(x);
        }
    }

    let svd = a.clone().svd(true, true);
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(x) = svd.solve(b, tol) {
            if x.iter().all(|v| v.is_finite()) {
                return Some(x);
            }
        }
    }

    None
}

/// Largest eigenvalue of `AᵀA` where `A = [1 | x]` (intercept column prepended).
///
/// Power iteration without forming `AᵀA`; a slight underestimate is corrected by
/// the caller's backtracking.
pub fn augmented_gram_max_eigenvalue(x: &DMatrix<f64>, iters: usize) -> f64 {
    let n = x.nrows();
    let p = x.ncols();
    if n == 0 {
        return 0.0;
    }

    let mut v = DVector::from_element(p + 1, 1.0 / ((p + 1) as f64).sqrt());
    let mut eig = 0.0;
    for _ in 0..iters.max(1) {
        // u = A v
        let mut u = x * v.rows(1, p);
        u.add_scalar_mut(v[0]);

        // w = Aᵀ u
        let mut w = DVector::zeros(p + 1);
        w[0] = u.sum();
        w.rows_mut(1, p).copy_from(&x.tr_mul(&u));

        let norm = w.norm();
        if !(norm.is_finite() && norm > 0.0) {
            return eig;
        }
        eig = norm;
        v = w / norm;
    }

    eig
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_spd_solves_simple_system() {
        let a = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        let x = solve_spd(&a, &b).unwrap();
        let r = &a * &x - &b;
        assert!(r.norm() < 1e-12);
    }

    #[test]
    fn solve_spd_falls_back_on_singular_matrix() {
        // Rank one: Cholesky fails, SVD returns the minimum-norm solution.
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let b = DVector::from_vec(vec![2.0, 2.0]);
        let x = solve_spd(&a, &b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-9);
        assert!((x[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn power_iteration_matches_known_spectrum() {
        // A = [1 | x] with x = [1, -1, 1, -1]ᵀ has orthogonal columns of squared
        // norm 4, so AᵀA = 4·I.
        let x = DMatrix::from_column_slice(4, 1, &[1.0, -1.0, 1.0, -1.0]);
        let eig = augmented_gram_max_eigenvalue(&x, 50);
        assert!((eig - 4.0).abs() < 1e-9, "eig = {eig}");
    }
}
