//! Core tree type definitions.
//!
//! The parent/child back-references of a topology tree are represented
//! with an arena of nodes addressed by stable index. Links between
//! neighbors are stored as indices rather than nested ownership, so the
//! whole structure is owned by a single `Tree` and no reference cycles
//! exist.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Classification of a server inside the relay hierarchy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    /// Name matched no recognized hub/leaf convention
    #[default]
    Unknown,
    /// Relay carrying traffic for multiple downstream leaves
    Hub,
    /// Terminal node with no downstream hierarchy
    Leaf,
}

/// A single server as decoded from the stats document, plus the fields
/// derived from it (label, position, transit).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    /// Unique server name; never empty for a valid record
    pub name: String,
    /// Name of the uplink server; empty marks a root candidate
    pub parent_name: String,
    /// Display label derived from the name by the scrubber
    pub label: String,
    /// Cumulative latency in milliseconds as reported upstream
    pub lag: i64,
    /// Number of users connected to this server
    pub users: u64,
    /// Free-form server description
    pub description: String,
    /// Hub/leaf classification derived from the name
    pub position: Position,
    /// Estimated traffic volume, filled in by transit propagation
    pub transit: u64,
}

/// Stable handle of a node inside a `Tree` arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// One side of a physical link between two adjacent nodes.
///
/// Both sides of a link carry the absolute lag difference between the
/// two endpoints' reported cumulative lags, and after propagation the
/// same transit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// The neighbor this edge leads to
    pub peer: NodeId,
    /// Absolute lag difference between the two endpoints
    pub lag: i64,
    /// Estimated traffic volume across the link
    pub transit: u64,
}

impl Edge {
    pub(crate) fn new(peer: NodeId, lag: i64) -> Self {
        Self {
            peer,
            lag,
            transit: 0,
        }
    }
}

/// Arena slot: one server snapshot plus its links
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub record: ServerRecord,
    /// Edge to the uplink; absent only for the root
    pub parent: Option<Edge>,
    /// Edges to downstream servers, in attachment order
    pub children: Vec<Edge>,
}

/// Single-rooted topology tree backed by an index-addressed arena.
///
/// Every node is reachable from the root by exactly one path and names
/// are unique. The index maps names back to arena slots and is rebuilt
/// after any shape-changing operation.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    pub(crate) nodes: Vec<TreeNode>,
    pub(crate) root: Option<NodeId>,
    pub(crate) index: HashMap<String, NodeId>,
}

impl Tree {
    /// Number of servers in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Handle of the root node, if the tree has any nodes
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Resolve a server name to its node handle
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    /// Number of edges incident to a node: child edges plus the parent
    /// edge when present
    pub fn degree(&self, id: NodeId) -> usize {
        let node = self.node(id);
        node.children.len() + usize::from(node.parent.is_some())
    }

    /// Insert the first node of the tree and make it root
    pub(crate) fn insert_root(&mut self, record: ServerRecord) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.index.insert(record.name.clone(), id);
        self.nodes.push(TreeNode {
            record,
            parent: None,
            children: Vec::new(),
        });
        self.root = Some(id);
        id
    }

    /// Attach a new node under `parent` with the given edge lag
    pub(crate) fn attach(&mut self, parent: NodeId, record: ServerRecord, lag: i64) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.index.insert(record.name.clone(), id);
        self.nodes.push(TreeNode {
            record,
            parent: Some(Edge::new(parent, lag)),
            children: Vec::new(),
        });
        self.node_mut(parent).children.push(Edge::new(id, lag));
        id
    }

    /// Node handles in pre-order: parent before children, siblings in
    /// attachment order. Deterministic for a given tree shape.
    pub(crate) fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push(root);
        }
        while let Some(id) = stack.pop() {
            order.push(id);
            for edge in self.node(id).children.iter().rev() {
                stack.push(edge.peer);
            }
        }
        order
    }

    /// Node handles in post-order: every child before its parent
    pub(crate) fn postorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push(root);
        }
        while let Some(id) = stack.pop() {
            order.push(id);
            for edge in &self.node(id).children {
                stack.push(edge.peer);
            }
        }
        order.reverse();
        order
    }

    /// Rebuild the name index from the current tree shape
    pub(crate) fn rebuild_index(&mut self) {
        self.index.clear();
        for id in self.preorder() {
            let name = self.node(id).record.name.clone();
            self.index.insert(name, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, parent: &str, lag: i64) -> ServerRecord {
        ServerRecord {
            name: name.to_string(),
            parent_name: parent.to_string(),
            lag,
            position: Position::Leaf,
            ..ServerRecord::default()
        }
    }

    #[test]
    fn test_degree_counts_parent_edge() {
        let mut tree = Tree::default();
        let root = tree.insert_root(leaf("root", "", 0));
        let mid = tree.attach(root, leaf("mid", "root", 3), 3);
        tree.attach(mid, leaf("deep", "mid", 5), 2);

        assert_eq!(tree.degree(root), 1);
        assert_eq!(tree.degree(mid), 2);
        assert_eq!(tree.degree(tree.lookup("deep").unwrap()), 1);
    }

    #[test]
    fn test_preorder_parent_before_children() {
        let mut tree = Tree::default();
        let root = tree.insert_root(leaf("root", "", 0));
        let a = tree.attach(root, leaf("a", "root", 1), 1);
        tree.attach(root, leaf("b", "root", 2), 2);
        tree.attach(a, leaf("a1", "a", 2), 1);

        let names: Vec<&str> = tree
            .preorder()
            .iter()
            .map(|&id| tree.node(id).record.name.as_str())
            .collect();
        assert_eq!(names, ["root", "a", "a1", "b"]);
    }

    #[test]
    fn test_postorder_children_before_parent() {
        let mut tree = Tree::default();
        let root = tree.insert_root(leaf("root", "", 0));
        let a = tree.attach(root, leaf("a", "root", 1), 1);
        tree.attach(root, leaf("b", "root", 2), 2);
        tree.attach(a, leaf("a1", "a", 2), 1);

        let order = tree.postorder();
        let pos = |name: &str| {
            order
                .iter()
                .position(|&id| tree.node(id).record.name == name)
                .unwrap()
        };
        assert!(pos("a1") < pos("a"));
        assert!(pos("a") < pos("root"));
        assert!(pos("b") < pos("root"));
    }

    #[test]
    fn test_empty_tree() {
        let tree = Tree::default();
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert!(tree.preorder().is_empty());
    }
}
