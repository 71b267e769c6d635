//! d3-compatible JSON graph output.

use std::collections::HashMap;

use color_eyre::eyre::Result;
use serde::Serialize;

use crate::tree::{edges, flatten, GraphEdge, Position, Tree};

/// One server as the browser visualization expects it
#[derive(Debug, Clone, Serialize)]
pub struct JsonNode {
    pub id: String,
    pub label: String,
    pub lagmillisecs: i64,
    pub usercount: u64,
    pub desc: String,
    pub group: u8,
}

/// Node/link graph document
#[derive(Debug, Serialize)]
pub struct JsonGraph {
    pub servers: Vec<JsonNode>,
    pub links: Vec<GraphEdge>,
}

/// Numeric group as the visualization palette expects it
fn group(position: Position) -> u8 {
    match position {
        Position::Unknown => 0,
        Position::Hub => 1,
        Position::Leaf => 2,
    }
}

/// Serialize the annotated tree as a d3 node/link graph.
///
/// With `display_all` off, unclassified servers and every link touching
/// one are left out of the document; the tree itself is untouched.
pub fn build_json(tree: &Tree, display_all: bool) -> Result<String> {
    let records = flatten(tree);
    let positions: HashMap<&str, Position> = records
        .iter()
        .map(|r| (r.name.as_str(), r.position))
        .collect();

    let known = |name: &str| {
        positions
            .get(name)
            .is_some_and(|&p| p != Position::Unknown)
    };

    let links: Vec<GraphEdge> = edges(tree)
        .into_iter()
        .filter(|edge| display_all || (known(&edge.source) && known(&edge.target)))
        .collect();

    let servers: Vec<JsonNode> = records
        .iter()
        .filter(|r| display_all || r.position != Position::Unknown)
        .map(|r| JsonNode {
            id: r.name.clone(),
            label: r.label.clone(),
            lagmillisecs: r.lag,
            usercount: r.users,
            desc: r.description.clone(),
            group: group(r.position),
        })
        .collect();

    Ok(serde_json::to_string(&JsonGraph { servers, links })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{assemble, ServerRecord};

    fn record(name: &str, parent: &str, lag: i64, users: u64, position: Position) -> ServerRecord {
        ServerRecord {
            name: name.to_string(),
            label: name.to_string(),
            parent_name: parent.to_string(),
            lag,
            users,
            position,
            ..ServerRecord::default()
        }
    }

    fn example_tree() -> Tree {
        assemble(&[
            record("hub", "", 0, 10, Position::Hub),
            record("leaf", "hub", 4, 5, Position::Leaf),
            record("odd", "hub", 2, 1, Position::Unknown),
        ])
    }

    #[test]
    fn test_json_contains_nodes_and_links() {
        let json = build_json(&example_tree(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["servers"].as_array().unwrap().len(), 3);
        assert_eq!(value["links"].as_array().unwrap().len(), 2);

        let hub = &value["servers"][0];
        assert_eq!(hub["id"], "hub");
        assert_eq!(hub["group"], 1);
        assert_eq!(hub["usercount"], 10);

        let link = value["links"]
            .as_array()
            .unwrap()
            .iter()
            .find(|l| l["target"] == "leaf")
            .unwrap();
        assert_eq!(link["source"], "hub");
        assert_eq!(link["lag"], 4);
        assert_eq!(link["transit"], 5);
    }

    #[test]
    fn test_json_filters_unknown_by_default() {
        let json = build_json(&example_tree(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let servers = value["servers"].as_array().unwrap();
        assert_eq!(servers.len(), 2);
        assert!(servers.iter().all(|s| s["id"] != "odd"));

        let links = value["links"].as_array().unwrap();
        assert_eq!(links.len(), 1);
        assert!(links.iter().all(|l| l["target"] != "odd"));
    }

    #[test]
    fn test_json_empty_tree() {
        let json = build_json(&Tree::default(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["servers"].as_array().unwrap().is_empty());
        assert!(value["links"].as_array().unwrap().is_empty());
    }
}
