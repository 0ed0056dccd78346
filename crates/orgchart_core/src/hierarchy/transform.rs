//! Raw collaborator records to normalized node list.
//!
//! # Responsibility
//! - Merge the root record, its secretaries and the flat member list into
//!   one ordered node list: root, members, secretaries.
//! - Fill display fallbacks and resolve image references.
//! - Normalize absent or root-pointing parent ids to "child of root".
//!
//! # Invariants
//! - Pure: identical input always yields an identical list.
//! - The root never appears twice, even when the member list contains it.
//! - Secretary nodes always point at the root.

use crate::model::node::{secretary_id, NodeId, OrgNode, SECRETARY_TITLE};
use crate::model::record::{MemberRecord, RootRecord};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_ROOT_LABEL: &str = "CEO";
const DEFAULT_MEMBER_NAME: &str = "Unnamed Member";
const DEFAULT_MEMBER_TITLE: &str = "Member";
const DEFAULT_SECRETARY_NAME: &str = "Unnamed Secretary";

/// Placeholder avatar used when a record carries no image.
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "https://i.pravatar.cc/100";

static ABSOLUTE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://").expect("valid absolute url regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// How parent ids that name no fetched member are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentPolicy {
    /// Re-home the member directly under the root and log a warning.
    #[default]
    Lenient,
    /// Reject the whole fetch with `TransformError::DanglingParent`.
    Strict,
}

/// Errors from hierarchy transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// Member points at a parent id missing from the fetched set.
    DanglingParent { node_id: NodeId, parent_id: NodeId },
}

impl Display for TransformError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingParent { node_id, parent_id } => write!(
                f,
                "member {node_id} references unknown parent {parent_id}"
            ),
        }
    }
}

impl Error for TransformError {}

/// Resolves raw image paths against the upload base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResolver {
    base_url: String,
    placeholder: String,
}

impl ImageResolver {
    pub fn new(base_url: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            placeholder: placeholder.into(),
        }
    }

    /// Returns an absolute URL for `raw`.
    ///
    /// - blank/absent -> placeholder
    /// - `http(s)://...` -> unchanged
    /// - anything else -> `<base_url><raw>`, with leading `/` dropped from
    ///   `raw`; `base_url` always ends in `/`, so `uploads/` + `/a.png`
    ///   never becomes `uploads//a.png`
    pub fn resolve(&self, raw: Option<&str>) -> String {
        match raw.map(str::trim).filter(|value| !value.is_empty()) {
            None => self.placeholder.clone(),
            Some(value) if is_absolute_url(value) => value.to_string(),
            Some(value) => format!("{}{}", self.base_url, value.trim_start_matches('/')),
        }
    }
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new(String::new(), DEFAULT_PLACEHOLDER_IMAGE)
    }
}

/// Transform settings derived from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOptions {
    pub images: ImageResolver,
    pub policy: ParentPolicy,
}

/// Builds the ordered node list for one fetch.
///
/// Returns an empty list when `root` is `None`; callers must treat that as a
/// failed fetch rather than render anything.
///
/// # Errors
/// - `DanglingParent` under `ParentPolicy::Strict` when a member points at an
///   id that is neither the root nor another fetched member.
pub fn build_nodes(
    root: Option<&RootRecord>,
    members: &[MemberRecord],
    options: &TransformOptions,
) -> Result<Vec<OrgNode>, TransformError> {
    let Some(root) = root else {
        return Ok(Vec::new());
    };
    let root_id = root.id.trim();
    let root_member = members.iter().find(|member| member.id.trim() == root_id);

    let mut nodes = Vec::with_capacity(1 + root.secretaries.len() + members.len());
    nodes.push(OrgNode {
        id: root_id.to_string(),
        parent_id: None,
        name: display_text(root.name.as_deref())
            .or_else(|| root_member.and_then(|m| display_text(m.name.as_deref())))
            .unwrap_or_else(|| DEFAULT_ROOT_LABEL.to_string()),
        title: display_text(root.title.as_deref())
            .or_else(|| root_member.and_then(|m| display_text(m.title.as_deref())))
            .unwrap_or_else(|| DEFAULT_ROOT_LABEL.to_string()),
        image_ref: options.images.resolve(
            non_blank(root.image_ref.as_deref())
                .or_else(|| root_member.and_then(|m| non_blank(m.image_ref.as_deref()))),
        ),
        is_secretary: false,
    });

    let member_ids: HashSet<&str> = members
        .iter()
        .map(|member| member.id.trim())
        .filter(|id| !id.is_empty() && *id != root_id)
        .collect();
    let mut seen = HashSet::new();

    for member in members {
        let member_id = member.id.trim();
        if member_id.is_empty() {
            warn!("event=hierarchy_normalize module=hierarchy status=skipped reason=blank_id");
            continue;
        }
        if member_id == root_id {
            continue;
        }
        if !seen.insert(member_id) {
            warn!(
                "event=hierarchy_normalize module=hierarchy status=skipped reason=duplicate_id node_id={member_id}"
            );
            continue;
        }

        let parent_id = resolve_parent(
            member_id,
            non_blank(member.parent_id.as_deref()),
            root_id,
            &member_ids,
            options.policy,
        )?;

        nodes.push(OrgNode {
            id: member_id.to_string(),
            parent_id: Some(parent_id),
            name: display_text(member.name.as_deref())
                .unwrap_or_else(|| DEFAULT_MEMBER_NAME.to_string()),
            title: display_text(member.title.as_deref())
                .unwrap_or_else(|| DEFAULT_MEMBER_TITLE.to_string()),
            image_ref: options.images.resolve(member.image_ref.as_deref()),
            is_secretary: false,
        });
    }

    for (index, secretary) in root.secretaries.iter().enumerate() {
        nodes.push(OrgNode {
            id: secretary_id(index),
            parent_id: Some(root_id.to_string()),
            name: display_text(secretary.name.as_deref())
                .unwrap_or_else(|| DEFAULT_SECRETARY_NAME.to_string()),
            title: SECRETARY_TITLE.to_string(),
            image_ref: options.images.resolve(secretary.image_ref.as_deref()),
            is_secretary: true,
        });
    }

    Ok(nodes)
}

fn resolve_parent(
    member_id: &str,
    raw_parent: Option<&str>,
    root_id: &str,
    member_ids: &HashSet<&str>,
    policy: ParentPolicy,
) -> Result<NodeId, TransformError> {
    match raw_parent {
        None => {
            debug!(
                "event=hierarchy_normalize module=hierarchy status=ok reason=missing_parent node_id={member_id}"
            );
            Ok(root_id.to_string())
        }
        Some(parent) if parent == root_id => Ok(root_id.to_string()),
        Some(parent) if member_ids.contains(parent) => Ok(parent.to_string()),
        Some(parent) => match policy {
            ParentPolicy::Strict => Err(TransformError::DanglingParent {
                node_id: member_id.to_string(),
                parent_id: parent.to_string(),
            }),
            ParentPolicy::Lenient => {
                warn!(
                    "event=hierarchy_normalize module=hierarchy status=rehomed reason=dangling_parent node_id={member_id} parent_id={parent}"
                );
                Ok(root_id.to_string())
            }
        },
    }
}

/// Returns whether `value` starts with `http://` or `https://` (any case).
pub(crate) fn is_absolute_url(value: &str) -> bool {
    ABSOLUTE_URL_RE.is_match(value)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn display_text(value: Option<&str>) -> Option<String> {
    non_blank(value).map(|value| WHITESPACE_RE.replace_all(value, " ").into_owned())
}
