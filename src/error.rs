use thiserror::Error;

use crate::domain::FitStatus;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Errors raised by the penalized fitter and its input preparation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("Design matrix has {rows} rows but the response has {labels} entries.")]
    DimensionMismatch { rows: usize, labels: usize },

    #[error("Cannot fit on an empty dataset.")]
    Empty,

    #[error("Penalty strength must be finite and non-negative, got {0}.")]
    InvalidPenalty(f64),

    #[error("Response must be binary (0 or 1); entry {index} is {value}.")]
    NonBinaryResponse { index: usize, value: f64 },

    #[error("Response contains only label {label}; the unpenalized intercept has no finite estimate.")]
    SingleClass { label: f64 },

    #[error("Design matrix entry ({row}, {col}) is not finite.")]
    NonFiniteDesign { row: usize, col: usize },

    #[error("Column {column} has zero variance and cannot be standardized.")]
    ConstantColumn { column: usize },

    #[error("Expected {expected} feature columns, got {actual}.")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("Invalid solver options: {0}")]
    InvalidOptions(String),

    #[error("Solver did not converge ({status}) after {iterations} iterations; gradient norm {grad_norm:.3e}.")]
    NotConverged {
        status: FitStatus,
        iterations: usize,
        grad_norm: f64,
    },
}

impl FitError {
    /// True when the error describes bad caller input rather than a numerical outcome.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, FitError::NotConverged { .. })
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let code = match err {
            FitError::SingleClass { .. } => 3,
            ref e if e.is_input_error() => 2,
            _ => 4,
        };
        AppError::new(code, err.to_string())
    }
}
