//! Tree normalization: re-rooting onto the best-connected node.
//!
//! Rerooting exists to produce visually balanced layouts. It preserves
//! pairwise distances along every path but carries no other meaning for
//! lag. Any transit values computed before a pivot are invalid
//! afterwards; propagation must rerun.

use super::types::{Edge, NodeId, Tree};

/// Re-root the tree onto its maximum-degree node.
///
/// Ties break to the first maximum encountered in pre-order. When the
/// maximum-degree node already is the root the tree is returned
/// unchanged. Otherwise every edge on the path from the old root to the
/// selected node is reversed, cumulative record lags and parent names
/// are rewritten root-down, and the index is rebuilt.
pub fn reroot(mut tree: Tree) -> Tree {
    let Some(root) = tree.root() else {
        return tree;
    };
    let target = best_root(&tree, root);
    if target == root {
        return tree;
    }
    pivot(&mut tree, target);
    rewrite_records(&mut tree);
    tree.rebuild_index();
    tree
}

/// First maximum-degree node in pre-order
fn best_root(tree: &Tree, root: NodeId) -> NodeId {
    let mut best = root;
    for id in tree.preorder() {
        if tree.degree(id) > tree.degree(best) {
            best = id;
        }
    }
    best
}

/// Reverse every edge on the path from the current root down to
/// `target`, making `target` the new root.
///
/// Iterative walk over the arena; recursion depth must not depend on
/// tree depth.
fn pivot(tree: &mut Tree, target: NodeId) {
    // Capture the upward path and its edge lags before mutating.
    let mut path = Vec::new();
    let mut cursor = target;
    while let Some(edge) = tree.node(cursor).parent {
        path.push((cursor, edge.peer, edge.lag));
        cursor = edge.peer;
    }

    // What was "parent of X" becomes "child of X". The reversed edge
    // keeps the stored absolute lag, so pairwise distances survive.
    for (child, parent, lag) in path {
        let parent_node = tree.node_mut(parent);
        parent_node.children.retain(|e| e.peer != child);
        parent_node.parent = Some(Edge::new(child, lag));
        tree.node_mut(child).children.push(Edge::new(parent, lag));
    }

    tree.node_mut(target).parent = None;
    tree.root = Some(target);
}

/// Rewrite each record's cumulative lag and parent name from the new
/// root down: the root reports lag 0 and no parent, every other node the
/// sum of edge lags on its path from the root.
fn rewrite_records(tree: &mut Tree) {
    for id in tree.preorder() {
        match tree.node(id).parent {
            None => {
                let node = tree.node_mut(id);
                node.record.lag = 0;
                node.record.parent_name.clear();
            }
            Some(edge) => {
                let parent = &tree.node(edge.peer).record;
                let lag = parent.lag + edge.lag;
                let parent_name = parent.name.clone();
                let node = tree.node_mut(id);
                node.record.lag = lag;
                node.record.parent_name = parent_name;
            }
        }
    }
}
