//! Raw records consumed from the member directory collaborator.
//!
//! These mirror what the backend hands out before normalization: optional
//! display fields, raw image paths and nullable parent ids.

use crate::model::node::NodeId;
use serde::{Deserialize, Serialize};

/// The organization root (CEO) plus its secretaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootRecord {
    pub id: NodeId,
    /// Falls back to the matching member record when absent.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Raw image path or absolute URL.
    #[serde(default)]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub secretaries: Vec<SecretaryRecord>,
}

impl RootRecord {
    /// Creates a root record carrying only its id.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Appends one secretary.
    pub fn with_secretary(mut self, secretary: SecretaryRecord) -> Self {
        self.secretaries.push(secretary);
        self
    }
}

/// Secretary entry attached to the root. Has no backend identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretaryRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl SecretaryRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            image_ref: None,
        }
    }
}

/// Flat member entry with nullable parent reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub id: NodeId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
}

impl MemberRecord {
    /// Creates a member with name, title and optional parent.
    pub fn new(
        id: impl Into<NodeId>,
        name: impl Into<String>,
        title: impl Into<String>,
        parent_id: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            title: Some(title.into()),
            image_ref: None,
            parent_id: parent_id.map(str::to_string),
        }
    }
}

/// Result of one `update_parent` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub success: bool,
}

impl UpdateOutcome {
    pub fn accepted() -> Self {
        Self { success: true }
    }

    pub fn rejected() -> Self {
        Self { success: false }
    }
}
