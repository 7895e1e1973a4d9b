//! `ridge-logit` library crate.
//!
//! The binary (`rlogit`) is a thin wrapper around this library so that:
//!
//! - the fitter and the simulation study are testable without spawning processes
//! - the penalized fitter can be called directly on any design matrix
//! - presentation (tables, charts, exports) stays separate from the numerics

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod study;
