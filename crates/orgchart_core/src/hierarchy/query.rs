//! Tree queries over parent-pointer node lists.
//!
//! # Invariants
//! - Every traversal tracks visited ids and terminates on cyclic input.
//! - Results borrow ids from the input slice; nothing is cloned.

use crate::model::node::OrgNode;
use std::collections::{HashMap, HashSet};

/// Returns whether `node` is the root.
pub fn is_root(node: &OrgNode) -> bool {
    node.parent_id.is_none()
}

/// Counts nodes without parent.
pub fn count_roots(nodes: &[OrgNode]) -> usize {
    nodes.iter().filter(|node| is_root(node)).count()
}

/// Iterates direct children of `node_id` in node-list order.
pub fn children_of<'a>(
    node_id: &'a str,
    nodes: &'a [OrgNode],
) -> impl Iterator<Item = &'a OrgNode> + 'a {
    nodes
        .iter()
        .filter(move |node| node.parent_id.as_deref() == Some(node_id))
}

/// Collects every id transitively reachable from `node_id` via child links.
///
/// Secretary children are included; they are leaves so they never extend the
/// walk. `node_id` itself only shows up in the result when the input contains
/// a cycle through it.
pub fn descendants_of<'a>(node_id: &str, nodes: &'a [OrgNode]) -> HashSet<&'a str> {
    let children = child_index(nodes);
    let mut found = HashSet::new();
    let mut stack: Vec<&str> = children.get(node_id).cloned().unwrap_or_default();

    while let Some(current) = stack.pop() {
        if !found.insert(current) {
            continue;
        }
        if let Some(next) = children.get(current) {
            stack.extend(next.iter().copied());
        }
    }

    found
}

/// Walks parent links upward from `node_id` (exclusive) toward the root.
///
/// Stops at the root, at a dangling parent id, or on the first revisited id.
/// The last element is the root only when the chain is intact.
pub fn ancestors_of<'a>(node_id: &str, nodes: &'a [OrgNode]) -> Vec<&'a str> {
    let by_id: HashMap<&str, &OrgNode> = nodes.iter().map(|node| (node.id.as_str(), node)).collect();
    let mut visited = HashSet::new();
    let mut chain = Vec::new();
    let mut cursor = by_id.get(node_id).and_then(|node| node.parent_id.as_deref());

    while let Some(current) = cursor {
        let Some(node) = by_id.get(current) else {
            break;
        };
        if !visited.insert(node.id.as_str()) {
            break;
        }
        chain.push(node.id.as_str());
        cursor = node.parent_id.as_deref();
    }

    chain
}

fn child_index(nodes: &[OrgNode]) -> HashMap<&str, Vec<&str>> {
    let mut index: HashMap<&str, Vec<&str>> = HashMap::new();
    for node in nodes {
        if let Some(parent) = node.parent_id.as_deref() {
            index.entry(parent).or_default().push(node.id.as_str());
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::{ancestors_of, count_roots, descendants_of};
    use crate::model::node::OrgNode;
    use std::collections::HashSet;

    fn node(id: &str, parent: Option<&str>) -> OrgNode {
        OrgNode {
            id: id.to_string(),
            parent_id: parent.map(str::to_string),
            name: id.to_string(),
            title: "Member".to_string(),
            image_ref: String::new(),
            is_secretary: id.starts_with("sec-"),
        }
    }

    fn chain() -> Vec<OrgNode> {
        vec![
            node("A", None),
            node("sec-0", Some("A")),
            node("B", Some("A")),
            node("C", Some("B")),
            node("D", Some("C")),
            node("E", Some("A")),
        ]
    }

    #[test]
    fn descendants_are_transitive() {
        let nodes = chain();
        let expected: HashSet<&str> = ["C", "D"].into_iter().collect();
        assert_eq!(descendants_of("B", &nodes), expected);

        let all = descendants_of("A", &nodes);
        assert_eq!(all.len(), 5);
        assert!(all.contains("sec-0"));
        assert!(!all.contains("A"));
    }

    #[test]
    fn descendants_of_leaf_or_unknown_is_empty() {
        let nodes = chain();
        assert!(descendants_of("D", &nodes).is_empty());
        assert!(descendants_of("missing", &nodes).is_empty());
    }

    #[test]
    fn descendants_terminate_on_cyclic_input() {
        let nodes = vec![node("A", None), node("X", Some("Y")), node("Y", Some("X"))];
        let found = descendants_of("X", &nodes);
        let expected: HashSet<&str> = ["X", "Y"].into_iter().collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn ancestors_end_at_root_for_intact_chain() {
        let nodes = chain();
        assert_eq!(ancestors_of("D", &nodes), vec!["C", "B", "A"]);
        assert!(ancestors_of("A", &nodes).is_empty());
    }

    #[test]
    fn ancestors_stop_on_dangling_or_cycle() {
        let dangling = vec![node("A", None), node("B", Some("ghost"))];
        assert!(ancestors_of("B", &dangling).is_empty());

        let cyclic = vec![node("A", None), node("X", Some("Y")), node("Y", Some("X"))];
        assert_eq!(ancestors_of("X", &cyclic), vec!["Y", "X"]);
    }

    #[test]
    fn count_roots_counts_parentless_nodes() {
        assert_eq!(count_roots(&chain()), 1);
        assert_eq!(count_roots(&[node("A", None), node("B", None)]), 2);
        assert_eq!(count_roots(&[]), 0);
    }
}
