//! Mathematical utilities: logistic primitives, dense solves and standardization.

pub mod linalg;
pub mod logistic;
pub mod standardize;

pub use linalg::*;
pub use logistic::*;
pub use standardize::*;
