//! Flattening and text rendering of an annotated tree.

use serde::Serialize;

use super::types::{ServerRecord, Tree};

/// One edge of the flattened graph, directed parent to child
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub lag: i64,
    pub transit: u64,
}

/// Flatten the tree to server records in pre-order, parent before
/// children. Deterministic: repeated calls on the same tree instance
/// yield identical sequences.
pub fn flatten(tree: &Tree) -> Vec<ServerRecord> {
    tree.preorder()
        .iter()
        .map(|&id| tree.node(id).record.clone())
        .collect()
}

/// Edge list parallel to [`flatten`]: one entry per non-root node, with
/// the parent on the source side.
pub fn edges(tree: &Tree) -> Vec<GraphEdge> {
    let mut out = Vec::new();
    for id in tree.preorder() {
        let node = tree.node(id);
        if let Some(edge) = node.parent {
            out.push(GraphEdge {
                source: tree.node(edge.peer).record.name.clone(),
                target: node.record.name.clone(),
                lag: edge.lag,
                transit: edge.transit,
            });
        }
    }
    out
}

/// Render the tree as an indented hierarchy with box-drawing connectors.
///
/// The root has no prefix. At each level the last child closes with a
/// corner, earlier children use a through-connector, and ancestor levels
/// continue with a rail while they still have siblings pending.
pub fn render_text(tree: &Tree) -> String {
    let mut out = String::new();
    let Some(root) = tree.root() else {
        return out;
    };

    // Children pushed in reverse so they pop in attachment order. The
    // connector is None only for the root.
    let mut stack: Vec<(_, String, Option<bool>)> = vec![(root, String::new(), None)];
    while let Some((id, prefix, connector)) = stack.pop() {
        let node = tree.node(id);
        if let Some(last) = connector {
            out.push_str(&prefix);
            out.push_str(if last { "└──" } else { "├──" });
        }
        out.push_str(&node.record.name);
        out.push('\n');

        let child_prefix = match connector {
            None => prefix,
            Some(true) => format!("{prefix}   "),
            Some(false) => format!("{prefix}│  "),
        };
        let count = node.children.len();
        for (i, edge) in node.children.iter().enumerate().rev() {
            stack.push((edge.peer, child_prefix.clone(), Some(i + 1 == count)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build::build;
    use crate::tree::reroot::reroot;
    use crate::tree::transit::propagate;
    use crate::tree::types::{Position, ServerRecord};

    fn record(name: &str, parent: &str, lag: i64, users: u64, position: Position) -> ServerRecord {
        ServerRecord {
            name: name.to_string(),
            parent_name: parent.to_string(),
            lag,
            users,
            position,
            ..ServerRecord::default()
        }
    }

    fn example_servers() -> Vec<ServerRecord> {
        vec![
            record("A", "", 0, 10, Position::Hub),
            record("B", "A", 4, 5, Position::Leaf),
            record("C", "A", 8, 1, Position::Hub),
            record("D", "C", 10, 20, Position::Leaf),
            record("E", "C", 9, 5, Position::Leaf),
            record("F", "C", 9, 14, Position::Leaf),
        ]
    }

    #[test]
    fn test_flatten_is_stable() {
        let tree = propagate(reroot(build(&example_servers())));
        let first = flatten(&tree);
        let second = flatten(&tree);
        assert_eq!(first, second);
    }

    #[test]
    fn test_edges_parallel_to_flatten() {
        let tree = propagate(reroot(build(&example_servers())));
        let edges = edges(&tree);

        assert_eq!(edges.len(), tree.len() - 1);
        assert_eq!(
            edges[0],
            GraphEdge {
                source: "C".to_string(),
                target: "D".to_string(),
                lag: 2,
                transit: 20,
            }
        );
        let ab = edges.iter().find(|e| e.target == "B").unwrap();
        assert_eq!(ab.source, "A");
        assert_eq!(ab.lag, 4);
        assert_eq!(ab.transit, 5);
    }

    #[test]
    fn test_render_text_connectors() {
        let tree = reroot(build(&example_servers()));
        let expected = "\
C
├──D
├──E
├──F
└──A
   └──B
";
        assert_eq!(render_text(&tree), expected);
    }

    #[test]
    fn test_render_text_rails_continue_past_open_levels() {
        let records = vec![
            record("root", "", 0, 1, Position::Hub),
            record("a", "root", 1, 1, Position::Hub),
            record("a1", "a", 2, 1, Position::Leaf),
            record("a2", "a", 3, 1, Position::Leaf),
            record("b", "root", 1, 1, Position::Leaf),
            record("c", "root", 1, 1, Position::Leaf),
            record("d", "root", 1, 1, Position::Leaf),
        ];
        // root already has maximal degree; no pivot.
        let tree = reroot(build(&records));
        let expected = "\
root
├──a
│  ├──a1
│  └──a2
├──b
├──c
└──d
";
        assert_eq!(render_text(&tree), expected);
    }

    #[test]
    fn test_render_text_empty_tree() {
        assert_eq!(render_text(&Tree::default()), "");
    }
}
