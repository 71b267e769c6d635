//! Tree construction from a flat record list.
//!
//! The builder picks a root (the first record without a parent name),
//! then attaches the remaining records by fixed-point insertion:
//! repeatedly scan the unresolved records, attaching each to its named
//! parent once that parent is present, until a full scan makes no
//! progress. O(n^2) worst case, acceptable for networks of this size.

use log::warn;

use super::types::{ServerRecord, Tree};

/// Build a tree from an unordered flat record list.
///
/// Records whose parent chain never reaches the root (broken chains,
/// cycles) are dropped with a warning. A second record carrying an
/// already-inserted name is ignored; the first writer wins.
pub fn build(records: &[ServerRecord]) -> Tree {
    let mut tree = Tree::default();
    let Some(root_index) = find_root(records) else {
        return tree;
    };
    tree.insert_root(records[root_index].clone());

    let mut changed = true;
    while changed {
        changed = false;
        for record in records {
            if tree.lookup(&record.name).is_some() {
                continue;
            }
            if let Some(parent) = tree.lookup(&record.parent_name) {
                let lag = (record.lag - tree.node(parent).record.lag).abs();
                tree.attach(parent, record.clone(), lag);
                changed = true;
            }
        }
    }

    for record in records {
        if tree.lookup(&record.name).is_none() {
            warn!(
                "dropping server {}: parent {} never resolved",
                record.name, record.parent_name
            );
        }
    }

    tree
}

/// Index of the record to use as root: the first record with an empty
/// parent name, falling back to the first record in input order.
fn find_root(records: &[ServerRecord]) -> Option<usize> {
    if records.is_empty() {
        return None;
    }
    match records.iter().position(|r| r.parent_name.is_empty()) {
        Some(index) => Some(index),
        None => {
            warn!(
                "no server without a parent; falling back to {} as root",
                records[0].name
            );
            Some(0)
        }
    }
}
