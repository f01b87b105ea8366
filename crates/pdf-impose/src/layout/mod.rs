//! Layout calculation modules for imposition
//!
//! This module handles all the geometric calculations for page imposition:
//! - Geometry primitives (sizes, points, rectangles, lines)
//! - Imposition matrices (which source page goes where, and its margins)
//! - Signature resolution (how many pages fit, which folds make them)

mod matrix;
mod signature;
mod types;

pub use matrix::*;
pub use signature::*;
pub use types::*;
