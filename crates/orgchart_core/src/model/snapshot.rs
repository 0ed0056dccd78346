//! Versioned hierarchy snapshot.
//!
//! # Responsibility
//! - Own one complete node list together with a monotonically increasing
//!   version.
//! - Provide lookups shared by renderer, validator and session.
//!
//! # Invariants
//! - A snapshot is never mutated after construction; `with_parent` returns a
//!   new snapshot with `version + 1`.
//! - Node order is preserved exactly as produced by the transform.

use crate::hierarchy::query;
use crate::model::node::{NodeId, OrgNode};

/// Immutable node list plus version stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    version: u64,
    nodes: Vec<OrgNode>,
}

impl Hierarchy {
    /// Wraps an already normalized node list.
    pub fn new(version: u64, nodes: Vec<OrgNode>) -> Self {
        Self { version, nodes }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn nodes(&self) -> &[OrgNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up one node by id.
    pub fn get(&self, id: &str) -> Option<&OrgNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Returns the first node without parent.
    pub fn root(&self) -> Option<&OrgNode> {
        self.nodes.iter().find(|node| node.is_root())
    }

    /// Returns direct children of `id` in node-list order.
    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a OrgNode> + 'a {
        query::children_of(id, &self.nodes)
    }

    /// Number of chart members shown in the page header (root and secretaries
    /// excluded).
    pub fn member_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| !node.is_root() && !node.is_secretary)
            .count()
    }

    /// Returns a new snapshot where `id` points at `parent_id`.
    ///
    /// Returns `None` when `id` is not part of this snapshot. Every other
    /// field of every node is carried over unchanged.
    pub fn with_parent(&self, id: &str, parent_id: Option<NodeId>) -> Option<Self> {
        let position = self.nodes.iter().position(|node| node.id == id)?;
        let mut nodes = self.nodes.clone();
        nodes[position].parent_id = parent_id;
        Some(Self {
            version: self.version + 1,
            nodes,
        })
    }
}
