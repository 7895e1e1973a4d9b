//! Synthetic data generation.

pub mod sample;

pub use sample::{draw_true_model, replicate_seed, simulate, truth_seed};
