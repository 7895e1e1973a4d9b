//! Export per-λ study summaries to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{LambdaSummary, StudyConfig};
use crate::error::AppError;

/// Write one row per λ to a CSV file.
pub fn write_summary_csv(
    path: &Path,
    summaries: &[LambdaSummary],
    config: &StudyConfig,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut file = BufWriter::new(file);

    // Header
    writeln!(
        file,
        "lambda,p,n_train,n_test,replicates,converged,failures,mean_norm_sq,bias_sq,variance,coef_mse,\
         mean_train_objective,mean_test_log_loss,sd_test_log_loss,mean_test_auc,mean_test_accuracy,mean_iterations"
    )
    .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for s in summaries {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            s.lambda,
            config.p,
            config.n_train,
            config.n_test,
            config.replicates,
            s.converged,
            s.failures,
            fmt_num(s.mean_norm_sq),
            fmt_num(s.bias_sq),
            fmt_num(s.variance),
            fmt_num(s.coef_mse),
            fmt_num(s.mean_train_objective),
            fmt_num(s.mean_test_log_loss),
            fmt_num(s.sd_test_log_loss),
            fmt_num(s.mean_test_auc),
            fmt_num(s.mean_test_accuracy),
            fmt_num(s.mean_iterations),
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    file.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    log::info!("wrote {} rows to {}", summaries.len(), path.display());

    Ok(())
}

/// Empty field for values that were not computed (no converged fit).
fn fmt_num(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.10}")
    } else {
        String::new()
    }
}
