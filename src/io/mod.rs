//! Output helpers.
//!
//! - per-λ summary export (CSV) (`export`)
//! - machine-readable run report (JSON) (`report`)

pub mod export;
pub mod report;

pub use export::*;
pub use report::*;
