//! First-order solver: accelerated gradient descent.
//!
//! Each iteration takes a gradient step of length `1/L` from the extrapolated
//! point `y`, where `L` starts at the Lipschitz estimate of the penalized
//! gradient and doubles whenever the sufficient-decrease test fails:
//!
//! ```text
//! x⁺ = y − ∇L(y)/L,   accept if L(x⁺) ≤ L(y) − ‖∇L(y)‖² / (2L)
//! ```
//!
//! Momentum follows Nesterov's `t` sequence and is reset whenever the objective
//! increases (function-value adaptive restart), which keeps the iteration stable
//! on the ill-conditioned λ = 0 problems this crate deliberately creates.

use nalgebra::DVector;

use crate::domain::{FitOptions, FitStatus};
use crate::fit::objective::PenalizedObjective;
use crate::fit::SolverState;

/// Step halvings allowed per iteration before the solver reports a stall.
const MAX_BACKTRACK: usize = 60;

pub(crate) fn minimize(
    obj: &PenalizedObjective<'_>,
    theta0: DVector<f64>,
    opts: &FitOptions,
) -> SolverState {
    let check_separation = obj.lambda() == 0.0;

    let lipschitz = obj.lipschitz_estimate();
    let mut step = if lipschitz.is_finite() && lipschitz > 0.0 {
        1.0 / lipschitz
    } else {
        1.0
    };

    let mut x = theta0;
    let (mut fx, mut gx) = obj.value_and_gradient(&x);
    if gx.norm() <= opts.grad_tol {
        return SolverState::new(x, FitStatus::Converged, 0, fx, gx.norm());
    }

    let mut y = x.clone();
    let mut t = 1.0_f64;

    for iter in 1..=opts.max_iter {
        let (fy, gy) = obj.value_and_gradient(&y);
        let gy_sq = gy.norm_squared();

        let mut accepted = None;
        for _ in 0..MAX_BACKTRACK {
            let candidate = &y - &gy * step;
            let f_candidate = obj.value(&candidate);
            if sufficient_decrease(fy, f_candidate, step, gy_sq) {
                accepted = Some((candidate, f_candidate));
                break;
            }
            step *= 0.5;
        }
        let Some((x_new, f_new)) = accepted else {
            log::trace!("gd: backtracking exhausted at iteration {iter}, step={step:.3e}");
            return SolverState::new(x, FitStatus::Stalled, iter - 1, fx, gx.norm());
        };

        let g_new = obj.gradient(&x_new);
        let g_norm = g_new.norm();

        if check_separation && obj.separates(&x_new) {
            return SolverState::new(x_new, FitStatus::Separated, iter, f_new, g_norm);
        }

        if g_norm <= opts.grad_tol || objective_settled(fx, f_new, opts.obj_tol) {
            return SolverState::new(x_new, FitStatus::Converged, iter, f_new, g_norm);
        }

        if f_new > fx {
            // Restart: drop momentum and continue from the new iterate.
            t = 1.0;
            y = x_new.clone();
        } else {
            let t_next = 0.5 * (1.0 + (1.0 + 4.0 * t * t).sqrt());
            let momentum = (t - 1.0) / t_next;
            y = &x_new + (&x_new - &x) * momentum;
            t = t_next;
        }

        if iter % 1000 == 0 {
            log::trace!("gd: iter={iter} f={f_new:.10} |g|={g_norm:.3e} step={step:.3e}");
        }

        x = x_new;
        fx = f_new;
        gx = g_new;
    }

    let g_norm = gx.norm();
    SolverState::new(x, FitStatus::MaxIterations, opts.max_iter, fx, g_norm)
}

/// Armijo test for a gradient step, tolerant of rounding once changes reach
/// machine precision.
fn sufficient_decrease(f_old: f64, f_new: f64, step: f64, grad_sq: f64) -> bool {
    if !f_new.is_finite() {
        return false;
    }
    let rounding = 4.0 * f64::EPSILON * f_old.abs().max(1.0);
    f_new <= f_old - 0.5 * step * grad_sq || (f_new - f_old).abs() <= rounding
}

fn objective_settled(f_old: f64, f_new: f64, tol: f64) -> bool {
    tol > 0.0 && f_new <= f_old && (f_old - f_new) <= tol * f_new.abs().max(1.0)
}
