//! Charts: a terminal ASCII plot and an SVG file.

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;
