//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - solver configuration (`SolverKind`, `FitOptions`)
//! - fit outputs (`Coefficients`, `PenalizedFit`, `FitStatus`)
//! - simulation and study types (`Dataset`, `TrueModel`, `StudyConfig`, `LambdaSummary`)

pub mod types;

pub use types::*;
