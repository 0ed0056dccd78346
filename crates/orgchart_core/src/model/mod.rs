//! Organization chart domain model.
//!
//! # Responsibility
//! - Define the normalized node shape shared by renderer, validator and
//!   edit session.
//! - Define the raw collaborator records the hierarchy is built from.
//! - Own the versioned hierarchy snapshot readers share per render cycle.
//!
//! # Invariants
//! - Node ids are unique within one snapshot.
//! - A committed snapshot has exactly one root and no cycles.
//! - Snapshots are immutable once shared; edits produce a new version.

pub mod node;
pub mod record;
pub mod snapshot;
