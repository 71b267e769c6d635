//! Output formatters.
//!
//! Formatters consume only the flattened record sequence and the
//! parallel edge list; they never reach into the tree structure itself.
//! The `display_all` toggle is honored here and nowhere else.

pub mod d3json;
pub mod dot;

// Re-export key functions for easier access
pub use d3json::build_json;
pub use dot::{build_dot, render_png, DotError};
