//! Shared run logic behind the `fit` and `study` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! true model -> simulated draw(s) -> standardize -> λ path -> held-out metrics
//!
//! The command handlers can then focus on presentation (tables, charts, exports).

use crate::domain::{StudyConfig, TrueModel};
use crate::error::AppError;
use crate::study::{Replicate, StudyOutput};

/// All computed outputs of a single `rlogit fit` run.
#[derive(Debug, Clone)]
pub struct FitRunOutput {
    pub truth: TrueModel,
    pub replicate: Replicate,
}

impl FitRunOutput {
    /// True when any λ stopped without converging.
    pub fn has_failures(&self) -> bool {
        self.replicate.fits.iter().any(|f| !f.converged())
    }
}

/// Draw the true model and fit every λ on one simulated train/test draw.
pub fn run_fit(config: &StudyConfig) -> Result<FitRunOutput, AppError> {
    let truth = crate::study::true_model(config)?;
    let replicate = crate::study::run_replicate(config, &truth, 0)?;

    for f in replicate.fits.iter().filter(|f| !f.converged()) {
        log::warn!("λ={}: {} after {} iterations", f.lambda, f.status, f.iterations);
    }

    Ok(FitRunOutput { truth, replicate })
}

/// Run the replicated bias-variance experiment.
pub fn run_study(config: &StudyConfig) -> Result<StudyOutput, AppError> {
    crate::study::run_study(config)
}
