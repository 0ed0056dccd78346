//! Local SQLite member directory.
//!
//! # Responsibility
//! - Serve the directory contract from a migrated SQLite connection
//!   (offline mode, fixtures, integration tests).
//! - Provide seeding helpers for root, secretaries and members.
//!
//! # Invariants
//! - Member listing is deterministic: `member_id ASC`.
//! - Secretary listing follows `position ASC`.
//! - `update_parent` on an unknown member reports `success=false`.

use super::{BackendResult, OrgBackend};
use crate::db::ensure_directory_schema;
use crate::model::record::{MemberRecord, RootRecord, SecretaryRecord, UpdateOutcome};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// SQLite-backed directory.
pub struct SqliteOrgBackend<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrgBackend<'conn> {
    /// Creates a backend over a migrated connection.
    ///
    /// # Errors
    /// - `Db(SchemaNotReady)` when the connection is not at the latest schema.
    /// - `Db(MissingTable)` when a directory table was dropped.
    pub fn try_new(conn: &'conn Connection) -> BackendResult<Self> {
        ensure_directory_schema(conn)?;
        Ok(Self { conn })
    }

    /// Replaces the root record (secretaries are kept).
    pub fn set_root(&self, root: &RootRecord) -> BackendResult<()> {
        self.conn.execute(
            "INSERT INTO org_root (slot, member_id, name, title, image_ref)
             VALUES (1, ?1, ?2, ?3, ?4)
             ON CONFLICT(slot) DO UPDATE SET
                member_id = excluded.member_id,
                name = excluded.name,
                title = excluded.title,
                image_ref = excluded.image_ref;",
            params![
                root.id.as_str(),
                root.name.as_deref(),
                root.title.as_deref(),
                root.image_ref.as_deref(),
            ],
        )?;
        Ok(())
    }

    /// Appends one secretary after the existing ones.
    pub fn add_secretary(&self, secretary: &SecretaryRecord) -> BackendResult<()> {
        self.conn.execute(
            "INSERT INTO org_secretaries (position, name, image_ref)
             VALUES ((SELECT COALESCE(MAX(position) + 1, 0) FROM org_secretaries), ?1, ?2);",
            params![secretary.name.as_deref(), secretary.image_ref.as_deref()],
        )?;
        Ok(())
    }

    /// Inserts or replaces one member row.
    pub fn upsert_member(&self, member: &MemberRecord) -> BackendResult<()> {
        self.conn.execute(
            "INSERT INTO org_members (member_id, name, title, image_ref, parent_member_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(member_id) DO UPDATE SET
                name = excluded.name,
                title = excluded.title,
                image_ref = excluded.image_ref,
                parent_member_id = excluded.parent_member_id,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                member.id.as_str(),
                member.name.as_deref(),
                member.title.as_deref(),
                member.image_ref.as_deref(),
                member.parent_id.as_deref(),
            ],
        )?;
        Ok(())
    }
}

impl OrgBackend for SqliteOrgBackend<'_> {
    fn fetch_root(&self) -> BackendResult<Option<RootRecord>> {
        let root = self
            .conn
            .query_row(
                "SELECT member_id, name, title, image_ref FROM org_root WHERE slot = 1;",
                [],
                |row| {
                    Ok(RootRecord {
                        id: row.get("member_id")?,
                        name: row.get("name")?,
                        title: row.get("title")?,
                        image_ref: row.get("image_ref")?,
                        secretaries: Vec::new(),
                    })
                },
            )
            .optional()?;
        let Some(mut root) = root else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT name, image_ref FROM org_secretaries ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            root.secretaries.push(SecretaryRecord {
                name: row.get("name")?,
                image_ref: row.get("image_ref")?,
            });
        }

        Ok(Some(root))
    }

    fn fetch_members(&self) -> BackendResult<Vec<MemberRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT member_id, name, title, image_ref, parent_member_id
             FROM org_members
             ORDER BY member_id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }

    fn update_parent(
        &self,
        node_id: &str,
        new_parent_id: Option<&str>,
    ) -> BackendResult<UpdateOutcome> {
        let changed = self.conn.execute(
            "UPDATE org_members
             SET
                parent_member_id = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE member_id = ?2;",
            params![new_parent_id, node_id],
        )?;

        if changed == 0 {
            info!(
                "event=directory_update module=backend status=rejected reason=unknown_member node_id={node_id}"
            );
            return Ok(UpdateOutcome::rejected());
        }
        Ok(UpdateOutcome::accepted())
    }
}

fn parse_member_row(row: &Row<'_>) -> BackendResult<MemberRecord> {
    Ok(MemberRecord {
        id: row.get("member_id")?,
        name: row.get("name")?,
        title: row.get("title")?,
        image_ref: row.get("image_ref")?,
        parent_id: row.get("parent_member_id")?,
    })
}

#[cfg(test)]
mod tests {
    use super::SqliteOrgBackend;
    use crate::backend::{BackendError, OrgBackend};
    use crate::db::{open_db_in_memory, DbError};
    use crate::model::record::{MemberRecord, RootRecord, SecretaryRecord};
    use rusqlite::Connection;

    #[test]
    fn unmigrated_connection_is_rejected() {
        let conn = Connection::open_in_memory().expect("in-memory db should open");
        let err = SqliteOrgBackend::try_new(&conn)
            .err()
            .expect("unmigrated connection must be rejected");
        assert!(matches!(
            err,
            BackendError::Db(DbError::SchemaNotReady { actual: 0, .. })
        ));
    }

    #[test]
    fn dropped_member_table_is_a_storage_error() {
        let conn = open_db_in_memory().expect("db should open");
        conn.execute_batch("DROP TABLE org_members;")
            .expect("table should drop");
        let err = SqliteOrgBackend::try_new(&conn)
            .err()
            .expect("missing table must be rejected");
        assert!(matches!(
            err,
            BackendError::Db(DbError::MissingTable("org_members"))
        ));
    }

    #[test]
    fn empty_directory_has_no_root() {
        let conn = open_db_in_memory().expect("db should open");
        let backend = SqliteOrgBackend::try_new(&conn).expect("backend should build");
        assert!(backend.fetch_root().expect("fetch should work").is_none());
        assert!(backend.fetch_members().expect("fetch should work").is_empty());
    }

    #[test]
    fn secretaries_keep_insertion_order() {
        let conn = open_db_in_memory().expect("db should open");
        let backend = SqliteOrgBackend::try_new(&conn).expect("backend should build");
        backend.set_root(&RootRecord::new("1")).expect("root should save");
        backend
            .add_secretary(&SecretaryRecord::new("Sara"))
            .expect("secretary should save");
        backend
            .add_secretary(&SecretaryRecord::new("Tom"))
            .expect("secretary should save");

        let root = backend
            .fetch_root()
            .expect("fetch should work")
            .expect("root should exist");
        let names: Vec<_> = root
            .secretaries
            .iter()
            .map(|s| s.name.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["Sara", "Tom"]);
    }

    #[test]
    fn update_parent_reports_unknown_member() {
        let conn = open_db_in_memory().expect("db should open");
        let backend = SqliteOrgBackend::try_new(&conn).expect("backend should build");
        backend
            .upsert_member(&MemberRecord::new("2", "Bo", "VP", None))
            .expect("member should save");

        assert!(backend.update_parent("2", Some("1")).expect("update").success);
        assert!(!backend.update_parent("9", Some("1")).expect("update").success);

        let members = backend.fetch_members().expect("fetch should work");
        assert_eq!(members[0].parent_id.as_deref(), Some("1"));
    }
}
