//! Member directory collaborator contract.
//!
//! # Responsibility
//! - Define the three request/response operations the chart consumes.
//! - Provide REST (`http`) and local SQLite (`sqlite`) implementations.
//!
//! # Invariants
//! - Implementations never apply hierarchy rules; validation happens before
//!   `update_parent` is called.
//! - Transport failures are reported as `BackendError`, never panics.

pub mod http;
pub mod sqlite;

pub use http::HttpOrgBackend;
pub use sqlite::SqliteOrgBackend;

use crate::db::DbError;
use crate::model::record::{MemberRecord, RootRecord, UpdateOutcome};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BackendResult<T> = Result<T, BackendError>;

/// Failures reported by a directory collaborator.
#[derive(Debug)]
pub enum BackendError {
    /// Session cookie missing or expired (HTTP 401).
    Unauthorized,
    /// Non-success HTTP status other than 401.
    Status(u16),
    /// Connection, TLS or timeout failure.
    Transport(String),
    /// Response body did not match the expected shape.
    Decode(String),
    /// Local directory storage failure.
    Db(DbError),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "directory session expired"),
            Self::Status(code) => write!(f, "directory responded with status {code}"),
            Self::Transport(message) => write!(f, "directory transport failure: {message}"),
            Self::Decode(message) => write!(f, "directory response malformed: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for BackendError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Directory operations consumed by the organization chart.
pub trait OrgBackend {
    /// Loads the root record; `Ok(None)` when no root is configured.
    fn fetch_root(&self) -> BackendResult<Option<RootRecord>>;
    /// Loads the flat member list.
    fn fetch_members(&self) -> BackendResult<Vec<MemberRecord>>;
    /// Persists a new parent for `node_id`; `None` makes it parentless.
    fn update_parent(
        &self,
        node_id: &str,
        new_parent_id: Option<&str>,
    ) -> BackendResult<UpdateOutcome>;
}

impl<T: OrgBackend + ?Sized> OrgBackend for &T {
    fn fetch_root(&self) -> BackendResult<Option<RootRecord>> {
        (**self).fetch_root()
    }

    fn fetch_members(&self) -> BackendResult<Vec<MemberRecord>> {
        (**self).fetch_members()
    }

    fn update_parent(
        &self,
        node_id: &str,
        new_parent_id: Option<&str>,
    ) -> BackendResult<UpdateOutcome> {
        (**self).update_parent(node_id, new_parent_id)
    }
}
