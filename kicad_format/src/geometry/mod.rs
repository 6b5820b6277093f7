//! Geometry helpers working on parsed footprints.

mod boundary;
mod grid;

pub use boundary::{draw_boundary, module_boundary, Rectangle};
pub use grid::Grid;
