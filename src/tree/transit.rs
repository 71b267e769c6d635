//! Transit propagation: estimated traffic volume per node and edge.
//!
//! Transit is a heuristic used for visual weighting, not a measured
//! quantity. One bottom-up pass assigns every node its estimate and
//! classifies every edge from the positions of its two endpoints.

use super::types::{Position, Tree};

/// Annotate the tree with transit values, bottom-up.
///
/// A node's transit defaults to its own user count. A hub additionally
/// accumulates the users of each directly attached leaf child, and a hub
/// hanging under a leaf takes over that parent's user count as its base.
/// Once both endpoints of an edge are final the edge is classified; both
/// sides of a link carry the same value.
pub fn propagate(mut tree: Tree) -> Tree {
    for id in tree.postorder() {
        let node = tree.node(id);
        let mut acc = node.record.users;
        if node.record.position == Position::Hub {
            if let Some(parent_edge) = node.parent {
                let parent = &tree.node(parent_edge.peer).record;
                if parent.position == Position::Leaf {
                    acc = parent.users;
                }
            }
            for edge in &node.children {
                let child = &tree.node(edge.peer).record;
                if child.position == Position::Leaf {
                    acc += child.users;
                }
            }
        }
        tree.node_mut(id).record.transit = acc;

        for i in 0..tree.node(id).children.len() {
            let edge = tree.node(id).children[i];
            let transit = classify_edge(
                tree.node(id).record.position,
                tree.node(id).record.transit,
                tree.node(edge.peer).record.position,
                tree.node(edge.peer).record.transit,
            );
            tree.node_mut(id).children[i].transit = transit;
            if let Some(parent_edge) = tree.node_mut(edge.peer).parent.as_mut() {
                parent_edge.transit = transit;
            }
        }
    }
    tree
}

/// Transit carried by the edge between a parent and one of its children
fn classify_edge(
    parent_position: Position,
    parent_transit: u64,
    child_position: Position,
    child_transit: u64,
) -> u64 {
    match (parent_position, child_position) {
        (Position::Leaf | Position::Unknown, _) => parent_transit,
        (Position::Hub, Position::Hub) => parent_transit.max(child_transit),
        (Position::Hub, _) => child_transit,
    }
}
