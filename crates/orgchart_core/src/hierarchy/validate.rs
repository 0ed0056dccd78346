//! Reparent admission rules.
//!
//! # Responsibility
//! - Decide whether moving one node under a proposed parent keeps the
//!   hierarchy a single-rooted tree.
//! - Pre-filter the parent candidates offered to the user.
//!
//! # Invariants
//! - Pure decision: never mutates the node list.
//! - Rules run in fixed order: root promotion, cycle, editable target,
//!   parent existence.

use crate::hierarchy::query::descendants_of;
use crate::model::node::{NodeId, OrgNode};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reason a proposed reparent was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Promoting `node_id` to root would leave two roots.
    MultipleRoots {
        node_id: NodeId,
        existing_root: NodeId,
    },
    /// `parent_id` is a descendant of `node_id`.
    Cycle { node_id: NodeId, parent_id: NodeId },
    /// Target is a secretary or unknown.
    NotEditable(NodeId),
    /// Proposed parent is unknown, a secretary or the node itself.
    InvalidParent(NodeId),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MultipleRoots { .. } => write!(f, "Cannot create multiple root nodes."),
            Self::Cycle { .. } => write!(f, "Cannot set a descendant as parent."),
            Self::NotEditable(_) => write!(f, "This node cannot be edited."),
            Self::InvalidParent(_) => write!(f, "The selected parent is not available."),
        }
    }
}

impl Error for ValidationError {}

/// Checks whether `edit_id` may move under `proposed_parent_id`.
///
/// `None` (or a blank id) means "make `edit_id` the root".
pub fn validate_reparent(
    nodes: &[OrgNode],
    edit_id: &str,
    proposed_parent_id: Option<&str>,
) -> Result<(), ValidationError> {
    let proposed = proposed_parent_id
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if proposed.is_none() {
        if let Some(existing) = nodes
            .iter()
            .find(|node| node.is_root() && node.id != edit_id)
        {
            return Err(ValidationError::MultipleRoots {
                node_id: edit_id.to_string(),
                existing_root: existing.id.clone(),
            });
        }
    }

    if let Some(parent_id) = proposed {
        if descendants_of(edit_id, nodes).contains(parent_id) {
            return Err(ValidationError::Cycle {
                node_id: edit_id.to_string(),
                parent_id: parent_id.to_string(),
            });
        }
    }

    match nodes.iter().find(|node| node.id == edit_id) {
        Some(node) if node.is_editable() => {}
        _ => return Err(ValidationError::NotEditable(edit_id.to_string())),
    }

    if let Some(parent_id) = proposed {
        let admissible = parent_id != edit_id
            && nodes
                .iter()
                .any(|node| node.id == parent_id && !node.is_secretary);
        if !admissible {
            return Err(ValidationError::InvalidParent(parent_id.to_string()));
        }
    }

    Ok(())
}

/// Lists nodes that may be offered as new parent of `edit_id`, in node-list
/// order: not the node itself, not one of its descendants, not a secretary.
pub fn candidate_parents<'a>(nodes: &'a [OrgNode], edit_id: &str) -> Vec<&'a OrgNode> {
    let descendants = descendants_of(edit_id, nodes);
    nodes
        .iter()
        .filter(|node| {
            node.id != edit_id && !node.is_secretary && !descendants.contains(node.id.as_str())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{candidate_parents, validate_reparent, ValidationError};
    use crate::model::node::OrgNode;

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

    fn tree() -> Vec<OrgNode> {
        vec![
            node("A", None),
            node("sec-0", Some("A")),
            node("B", Some("A")),
            node("C", Some("B")),
            node("D", Some("A")),
        ]
    }

    #[test]
    fn descendant_parent_is_a_cycle() {
        assert_eq!(
            validate_reparent(&tree(), "B", Some("C")),
            Err(ValidationError::Cycle {
                node_id: "B".to_string(),
                parent_id: "C".to_string(),
            })
        );
    }

    #[test]
    fn second_root_is_refused() {
        assert_eq!(
            validate_reparent(&tree(), "B", None),
            Err(ValidationError::MultipleRoots {
                node_id: "B".to_string(),
                existing_root: "A".to_string(),
            })
        );
        assert!(matches!(
            validate_reparent(&tree(), "B", Some("  ")),
            Err(ValidationError::MultipleRoots { .. })
        ));
    }

    #[test]
    fn root_may_stay_root() {
        assert_eq!(validate_reparent(&tree(), "A", None), Ok(()));
    }

    #[test]
    fn secretary_is_never_editable() {
        assert_eq!(
            validate_reparent(&tree(), "sec-0", Some("B")),
            Err(ValidationError::NotEditable("sec-0".to_string()))
        );
        assert_eq!(
            validate_reparent(&tree(), "ghost", Some("B")),
            Err(ValidationError::NotEditable("ghost".to_string()))
        );
    }

    #[test]
    fn secretary_self_and_unknown_parents_are_invalid() {
        for parent in ["sec-0", "D", "ghost"] {
            let edit = if parent == "D" { "D" } else { "C" };
            assert_eq!(
                validate_reparent(&tree(), edit, Some(parent)),
                Err(ValidationError::InvalidParent(parent.to_string()))
            );
        }
    }

    #[test]
    fn sibling_parent_is_admissible() {
        assert_eq!(validate_reparent(&tree(), "D", Some("B")), Ok(()));
        assert_eq!(validate_reparent(&tree(), "C", Some("A")), Ok(()));
    }

    #[test]
    fn candidates_exclude_self_descendants_and_secretaries() {
        let nodes = tree();
        let ids: Vec<&str> = candidate_parents(&nodes, "B")
            .into_iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, vec!["A", "D"]);
    }
}
