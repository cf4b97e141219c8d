//! [`ImportTx`] over one open SQLite transaction.

use chrono::{DateTime, SecondsFormat, Utc};
use quarry_bd::{ImportTx, Issue, IssueEvent};
use quarry_kernel::split_issue_id;
use rusqlite::{Connection, OptionalExtension, ffi, params};

use crate::error::{SqliteStoreError, has_extended_code};

/// Borrowed handle on an open transaction.
///
/// Built from a `&rusqlite::Transaction` (which derefs to `Connection`); it
/// never begins, commits or rolls back.
pub struct SqliteTx<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteTx<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// The connection the transaction runs on, for reads alongside ingestion.
    pub fn connection(&self) -> &'a Connection {
        self.conn
    }
}

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn format_opt(at: Option<DateTime<Utc>>) -> Option<String> {
    at.map(format_timestamp)
}

impl ImportTx for SqliteTx<'_> {
    type Error = SqliteStoreError;

    fn config_value(&mut self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self
            .conn
            .query_row("SELECT value FROM config WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?)
    }

    fn issue_exists(&mut self, id: &str) -> Result<bool, Self::Error> {
        Ok(self
            .conn
            .query_row("SELECT 1 FROM issues WHERE id = ?1", [id], |_| Ok(()))
            .optional()?
            .is_some())
    }

    fn count_top_level_issues(&mut self, prefix: &str) -> Result<usize, Self::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM issues WHERE substr(id, 1, length(?1) + 1) = ?1 || '-'")?;
        let ids = stmt.query_map([prefix], |row| row.get::<_, String>(0))?;

        let mut count = 0;
        for id in ids {
            let id = id?;
            if matches!(split_issue_id(&id), Some((p, key)) if p == prefix && !key.contains('.')) {
                count += 1;
            }
        }
        Ok(count)
    }

    fn insert_issue_strict(&mut self, issue: &Issue) -> Result<(), Self::Error> {
        let metadata = issue
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let created_at = issue.created_at.map(format_timestamp).unwrap_or_default();
        let updated_at = issue.updated_at.map(format_timestamp).unwrap_or_default();

        let inserted = self.conn.execute(
            "INSERT INTO issues (
                id, content_hash, title, description, design, acceptance_criteria, notes,
                status, priority, issue_type, assignee, owner, created_by,
                created_at, updated_at, closed_at, close_reason,
                deleted_at, deleted_by, delete_reason,
                external_ref, ephemeral, pinned, metadata
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24
            )",
            params![
                issue.id,
                issue.content_hash,
                issue.title,
                issue.description,
                issue.design,
                issue.acceptance_criteria,
                issue.notes,
                issue.status.as_str(),
                issue.priority,
                issue.issue_type.as_str(),
                issue.assignee,
                issue.owner,
                issue.created_by,
                created_at,
                updated_at,
                format_opt(issue.closed_at),
                issue.close_reason,
                format_opt(issue.deleted_at),
                issue.deleted_by,
                issue.delete_reason,
                issue.external_ref,
                issue.ephemeral,
                issue.pinned,
                metadata,
            ],
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(err) if has_extended_code(&err, ffi::SQLITE_CONSTRAINT_PRIMARYKEY) => {
                Err(SqliteStoreError::IssueAlreadyExists(issue.id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn record_event(&mut self, event: &IssueEvent) -> Result<(), Self::Error> {
        let payload = serde_json::to_string(&event.action)?;
        let inserted = self.conn.execute(
            "INSERT INTO events (event_id, issue_id, event_type, actor, comment, new_value, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.event_id,
                event.issue_id,
                event.kind(),
                event.actor,
                event.comment,
                payload,
                format_timestamp(event.occurred_at),
            ],
        );
        match inserted {
            Ok(_) => Ok(()),
            Err(err) if has_extended_code(&err, ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
                Err(SqliteStoreError::IssueNotFound(event.issue_id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn mark_dirty(
        &mut self,
        issue_id: &str,
        marked_at: DateTime<Utc>,
    ) -> Result<(), Self::Error> {
        let marked = self.conn.execute(
            "INSERT INTO dirty_issues (issue_id, marked_at) VALUES (?1, ?2)
             ON CONFLICT(issue_id) DO UPDATE SET marked_at = excluded.marked_at",
            params![issue_id, format_timestamp(marked_at)],
        );
        match marked {
            Ok(_) => Ok(()),
            Err(err) if has_extended_code(&err, ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
                Err(SqliteStoreError::IssueNotFound(issue_id.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
