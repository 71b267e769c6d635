//! Topology tree engine.
//!
//! Turns the flat server list decoded from a stats document into a
//! single-rooted annotated tree: build, re-root onto the best-connected
//! node, propagate transit estimates, then flatten for the formatters.

pub mod build;
pub mod reroot;
pub mod transit;
pub mod traverse;
pub mod types;

// Re-export key types and functions for easier access
pub use build::build;
pub use reroot::reroot;
pub use transit::propagate;
pub use traverse::{edges, flatten, render_text, GraphEdge};
pub use types::{Edge, NodeId, Position, ServerRecord, Tree, TreeNode};

/// Build, normalize and annotate a tree from a flat record list.
///
/// Equivalent to `propagate(reroot(build(records)))`; every render
/// starts from a fresh flat list, nothing is shared between calls.
pub fn assemble(records: &[ServerRecord]) -> Tree {
    propagate(reroot(build(records)))
}
