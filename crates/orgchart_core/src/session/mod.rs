//! Organization chart page session.
//!
//! # Responsibility
//! - Own the committed hierarchy snapshot for one chart page.
//! - Sequence fetches so only the latest result lands.
//! - Drive the edit dialog: Idle -> Editing -> Saving -> Idle/Editing.
//!
//! # Invariants
//! - Validation failures never reach the backend.
//! - At most one persist is in flight; Saving rejects further input.
//! - A failed persist leaves the snapshot untouched.

mod controller;
mod fetch;

pub use controller::{
    EditDraft, EditState, FetchOutcome, FetchPayload, LoadState, OrgChartSession, PersistTicket,
};
pub use fetch::{FetchGuard, FetchTicket};

use crate::backend::BackendError;
use crate::hierarchy::integrity::IntegrityError;
use crate::hierarchy::transform::TransformError;
use crate::hierarchy::validate::ValidationError;
use crate::model::node::NodeId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Chart data could not be loaded; nothing is displayed.
///
/// `Display` is a fixed user-safe sentence; details live in `source()`.
#[derive(Debug)]
pub enum FetchError {
    RootNotFound,
    Backend(BackendError),
    Transform(TransformError),
    Corrupt(IntegrityError),
}

impl FetchError {
    /// Stable code for log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RootNotFound => "root_not_found",
            Self::Backend(BackendError::Unauthorized) => "unauthorized",
            Self::Backend(_) => "backend",
            Self::Transform(_) => "transform",
            Self::Corrupt(_) => "corrupt",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RootNotFound => write!(
                f,
                "The organization chart has no CEO configured yet."
            ),
            Self::Backend(BackendError::Unauthorized) => write!(
                f,
                "Your session has expired. Please sign in again."
            ),
            Self::Backend(_) | Self::Transform(_) | Self::Corrupt(_) => write!(
                f,
                "Cannot display the organization chart. Please try again."
            ),
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RootNotFound => None,
            Self::Backend(err) => Some(err),
            Self::Transform(err) => Some(err),
            Self::Corrupt(err) => Some(err),
        }
    }
}

/// Parent update failed at the collaborator.
///
/// `Display` is a fixed user-safe sentence; details live in `source()`.
#[derive(Debug)]
pub enum PersistError {
    /// Backend answered `success=false`.
    Rejected { node_id: NodeId },
    Backend(BackendError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected { .. } => write!(f, "Failed to update parent. Please try again."),
            Self::Backend(_) => write!(f, "Error saving parent. Please try again."),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected { .. } => None,
            Self::Backend(err) => Some(err),
        }
    }
}

/// Errors surfaced by session transitions.
#[derive(Debug)]
pub enum SessionError {
    Validation(ValidationError),
    Persist(PersistError),
    /// Operation needs an open edit dialog.
    NotEditing,
    /// A persist is in flight; input is disabled.
    SaveInProgress,
    /// No committed snapshot yet.
    NotLoaded,
    /// Ticket does not belong to the in-flight persist.
    StaleTicket,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Persist(err) => write!(f, "{err}"),
            Self::NotEditing => write!(f, "no node is being edited"),
            Self::SaveInProgress => write!(f, "a save is already in progress"),
            Self::NotLoaded => write!(f, "organization chart is not loaded"),
            Self::StaleTicket => write!(f, "save ticket does not match the pending save"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persist(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for SessionError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PersistError> for SessionError {
    fn from(value: PersistError) -> Self {
        Self::Persist(value)
    }
}
