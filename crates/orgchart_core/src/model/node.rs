//! Normalized organization node.
//!
//! # Responsibility
//! - Define the single node shape every hierarchy consumer reads.
//!
//! # Invariants
//! - `parent_id == None` only for the root.
//! - Secretary nodes always point at the root and are never edited.

use serde::{Deserialize, Serialize};

/// Stable node identifier as issued by the member directory.
///
/// Secretary nodes use synthetic `sec-<index>` ids.
pub type NodeId = String;

/// Title given to every secretary node.
pub const SECRETARY_TITLE: &str = "Secretary";

/// One entry of the normalized hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgNode {
    /// Unique id within the current snapshot.
    pub id: NodeId,
    /// Parent node id. `None` means this node is the root.
    pub parent_id: Option<NodeId>,
    /// Display name.
    pub name: String,
    /// Display title (position).
    pub title: String,
    /// Resolved image URL.
    pub image_ref: String,
    /// Display-only leaf pinned under the root.
    pub is_secretary: bool,
}

impl OrgNode {
    /// Returns whether this node is the root.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Returns whether the edit flow may target this node.
    pub fn is_editable(&self) -> bool {
        !self.is_secretary
    }

    /// Returns parent id as borrowed str.
    pub fn parent(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }
}

/// Builds the synthetic id used for the secretary at `index`.
pub fn secretary_id(index: usize) -> NodeId {
    format!("sec-{index}")
}

#[cfg(test)]
mod tests {
    use super::{secretary_id, OrgNode};

    fn node(id: &str, parent: Option<&str>) -> OrgNode {
        OrgNode {
            id: id.to_string(),
            parent_id: parent.map(str::to_string),
            name: id.to_string(),
            title: "Member".to_string(),
            image_ref: String::new(),
            is_secretary: false,
        }
    }

    #[test]
    fn root_is_node_without_parent() {
        assert!(node("1", None).is_root());
        assert!(!node("2", Some("1")).is_root());
    }

    #[test]
    fn secretary_ids_follow_list_position() {
        assert_eq!(secretary_id(0), "sec-0");
        assert_eq!(secretary_id(12), "sec-12");
    }

    #[test]
    fn node_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(node("7", Some("1"))).expect("node should serialize");
        assert_eq!(value["parentId"], "1");
        assert_eq!(value["isSecretary"], false);
        assert_eq!(value["imageRef"], "");
    }
}
