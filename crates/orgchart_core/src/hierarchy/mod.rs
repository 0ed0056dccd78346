//! Hierarchy construction, queries and edit admission.
//!
//! # Responsibility
//! - Turn collaborator records into a normalized node list (`transform`).
//! - Answer descendant/ancestor/root questions (`query`).
//! - Verify fetched data before it becomes committed state (`integrity`).
//! - Gate reparent edits (`validate`).
//!
//! # Invariants
//! - Everything here is a pure function over borrowed node slices.

pub mod integrity;
pub mod query;
pub mod transform;
pub mod validate;
