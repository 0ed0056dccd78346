//! Committed-state integrity check for freshly fetched hierarchies.
//!
//! # Invariants
//! - Exactly one root.
//! - Unique ids.
//! - Every parent id names an existing node.
//! - Every node reaches the root through parent links.
//! - Secretaries hang directly under the root.

use crate::hierarchy::query::{ancestors_of, count_roots};
use crate::model::node::{NodeId, OrgNode};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// First invariant violation found in a node list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    NoRoot,
    MultipleRoots { count: usize },
    DuplicateId(NodeId),
    DanglingParent { node_id: NodeId, parent_id: NodeId },
    /// Node is caught in a parent cycle and never reaches the root.
    Unreachable(NodeId),
    SecretaryMisplaced(NodeId),
}

impl Display for IntegrityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRoot => write!(f, "hierarchy has no root"),
            Self::MultipleRoots { count } => write!(f, "hierarchy has {count} roots"),
            Self::DuplicateId(id) => write!(f, "hierarchy contains duplicate id {id}"),
            Self::DanglingParent { node_id, parent_id } => {
                write!(f, "node {node_id} references missing parent {parent_id}")
            }
            Self::Unreachable(id) => write!(f, "node {id} does not reach the root"),
            Self::SecretaryMisplaced(id) => {
                write!(f, "secretary {id} is not a direct child of the root")
            }
        }
    }
}

impl Error for IntegrityError {}

/// Verifies committed-state invariants in node-list order.
pub fn check_integrity(nodes: &[OrgNode]) -> Result<(), IntegrityError> {
    let roots = count_roots(nodes);
    if roots == 0 {
        return Err(IntegrityError::NoRoot);
    }
    if roots > 1 {
        return Err(IntegrityError::MultipleRoots { count: roots });
    }

    let mut ids = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !ids.insert(node.id.as_str()) {
            return Err(IntegrityError::DuplicateId(node.id.clone()));
        }
    }

    let root_id = nodes
        .iter()
        .find(|node| node.is_root())
        .map(|node| node.id.as_str())
        .ok_or(IntegrityError::NoRoot)?;

    for node in nodes {
        let Some(parent_id) = node.parent_id.as_deref() else {
            continue;
        };
        if !ids.contains(parent_id) {
            return Err(IntegrityError::DanglingParent {
                node_id: node.id.clone(),
                parent_id: parent_id.to_string(),
            });
        }
        if node.is_secretary && parent_id != root_id {
            return Err(IntegrityError::SecretaryMisplaced(node.id.clone()));
        }
        if ancestors_of(&node.id, nodes).last().copied() != Some(root_id) {
            return Err(IntegrityError::Unreachable(node.id.clone()));
        }
    }

    Ok(())
}
