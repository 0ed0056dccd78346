//! Local member directory storage.
//!
//! # Responsibility
//! - Open file or in-memory directory databases with the schema applied.
//! - Check that a caller-supplied connection carries the directory schema.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - `org_root`, `org_secretaries` and `org_members` exist whenever
//!   `ensure_directory_schema` succeeds.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

use migrations::{current_user_version, latest_version};
use rusqlite::Connection;

/// Tables the directory backend reads and writes.
pub const DIRECTORY_TABLES: [&str; 3] = ["org_root", "org_secretaries", "org_members"];

pub type DbResult<T> = Result<T, DbError>;

/// Directory storage failures.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// File was written by a newer build; refusing to downgrade it.
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
    /// Connection was never migrated to this build's schema.
    SchemaNotReady { expected: u32, actual: u32 },
    MissingTable(&'static str),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "directory database error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "directory schema v{db_version} is newer than this build (v{latest_supported})"
            ),
            Self::SchemaNotReady { expected, actual } => write!(
                f,
                "directory schema is at v{actual}, expected v{expected}; open it with open_db"
            ),
            Self::MissingTable(table) => write!(f, "directory table `{table}` is missing"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Verifies `conn` is at the latest directory schema with every table present.
pub fn ensure_directory_schema(conn: &Connection) -> DbResult<()> {
    let expected = latest_version();
    let actual = current_user_version(conn)?;
    if actual != expected {
        return Err(DbError::SchemaNotReady { expected, actual });
    }

    for table in DIRECTORY_TABLES {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::MissingTable(table));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_directory_schema, open_db_in_memory, DbError};
    use rusqlite::Connection;

    #[test]
    fn migrated_connection_is_ready() {
        let conn = open_db_in_memory().expect("db should open");
        ensure_directory_schema(&conn).expect("fresh db should be ready");
    }

    #[test]
    fn unmigrated_connection_reports_versions() {
        let conn = Connection::open_in_memory().expect("in-memory db should open");
        let err = ensure_directory_schema(&conn).expect_err("blank db must not be ready");
        assert!(matches!(
            err,
            DbError::SchemaNotReady {
                expected: 1,
                actual: 0
            }
        ));
    }

    #[test]
    fn dropped_table_is_reported() {
        let conn = open_db_in_memory().expect("db should open");
        conn.execute_batch("DROP TABLE org_secretaries;")
            .expect("table should drop");
        let err = ensure_directory_schema(&conn).expect_err("missing table must be reported");
        assert!(matches!(err, DbError::MissingTable("org_secretaries")));
    }
}
