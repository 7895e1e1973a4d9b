//! Numerically stable logistic primitives.
//!
//! Every likelihood in the crate is evaluated through these helpers so that large
//! linear predictors (|η| in the hundreds, common for near-separable fits) never
//! overflow `exp` or take `log(0)`.

/// Logistic function `h(z) = 1 / (1 + e^(−z))`.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `log(1 + e^z)` without overflow.
pub fn log1pexp(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

/// Negative log-likelihood of one observation: `log(1 + e^η) − y·η`.
///
/// Equals `−[y·log h(η) + (1−y)·log(1 − h(η))]` for `y ∈ {0, 1}`.
pub fn bernoulli_nll(eta: f64, y: f64) -> f64 {
    log1pexp(eta) - y * eta
}

/// `log(p / (1 − p))`.
pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}
