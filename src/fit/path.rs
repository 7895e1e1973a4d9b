//! λ grid generation.
//!
//! Bias-variance curves are read on a log scale, so the default grid is
//! log-spaced between a small and a large penalty, with the unpenalized λ = 0
//! fit prepended as the maximum-likelihood baseline.

use crate::error::AppError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid lambda range: min={min}, max={max} (must be finite, >0, and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Lambda steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Log-spaced λ grid, optionally starting with `0.0`.
pub fn lambda_grid(min: f64, max: f64, steps: usize, include_zero: bool) -> Result<Vec<f64>, AppError> {
    let mut out = Vec::with_capacity(steps + 1);
    if include_zero {
        out.push(0.0);
    }
    out.extend(log_space(min, max, steps)?);
    Ok(out)
}

/// Check an explicit λ list: non-empty, finite, non-negative. Sorted ascending,
/// duplicates removed.
pub fn normalize_lambdas(lambdas: &[f64]) -> Result<Vec<f64>, AppError> {
    if lambdas.is_empty() {
        return Err(AppError::new(2, "At least one lambda is required."));
    }
    if let Some(bad) = lambdas.iter().find(|l| !(l.is_finite() && **l >= 0.0)) {
        return Err(AppError::new(
            2,
            format!("Invalid lambda {bad}: penalties must be finite and >= 0."),
        ));
    }

    let mut out = lambdas.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    out.dedup();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.001, 1.0, 4).unwrap();
        assert_eq!(v.len(), 4);
        assert!((v[0] - 0.001).abs() < 1e-15);
        assert!((v[1] - 0.01).abs() < 1e-12);
        assert!((v[3] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn lambda_grid_prepends_zero() {
        let grid = lambda_grid(0.01, 1.0, 3, true).unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0], 0.0);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn log_space_rejects_bad_range() {
        assert!(log_space(0.0, 1.0, 5).is_err());
        assert!(log_space(1.0, 0.5, 5).is_err());
        assert!(log_space(0.1, 1.0, 1).is_err());
    }

    #[test]
    fn normalize_lambdas_sorts_and_validates() {
        let v = normalize_lambdas(&[0.1, 0.0, 0.1, 0.01]).unwrap();
        assert_eq!(v, vec![0.0, 0.01, 0.1]);
        assert!(normalize_lambdas(&[]).is_err());
        assert_eq!(normalize_lambdas(&[-1.0]).unwrap_err().exit_code(), 2);
        assert!(normalize_lambdas(&[f64::INFINITY]).is_err());
    }
}
