//! Logistic model evaluation.
//!
//! Models are implemented as small, pure functions so that fitting, metrics and
//! simulation code can stay generic.

pub mod model;

pub use model::*;
