//! Store-level operations around [`SqliteTx`].

use std::path::Path;

use chrono::{DateTime, Utc};
use quarry_bd::{
    CUSTOM_STATUSES_KEY, CUSTOM_TYPES_KEY, ISSUE_EVENT_SCHEMA, ISSUE_PREFIX_KEY, ImportMode,
    ImportTx, Issue, IssueEvent, IssueType, Status, create_or_import, format_name_list,
    parse_name_list,
};
use quarry_kernel::hierarchy_depth;
use rusqlite::types::Type;
use rusqlite::{Connection, InterruptHandle, OptionalExtension, Row, TransactionBehavior, params};

use crate::error::{BatchImportError, CreateError, SqliteStoreError};
use crate::schema::apply_schema;
use crate::tx::SqliteTx;

const ISSUE_COLUMNS: &str = "id, content_hash, title, description, design, acceptance_criteria, notes, \
     status, priority, issue_type, assignee, owner, created_by, \
     created_at, updated_at, closed_at, close_reason, \
     deleted_at, deleted_by, delete_reason, \
     external_ref, ephemeral, pinned, metadata";

/// A SQLite-backed issue store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteStoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SqliteStoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        apply_schema(&conn)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Configure the namespace prefix every issue id is rooted under.
    pub fn init(&self, prefix: &str) -> Result<(), SqliteStoreError> {
        let prefix = prefix.trim();
        if prefix.is_empty() || prefix.ends_with('-') {
            return Err(SqliteStoreError::InvalidPrefix(prefix.to_string()));
        }
        self.set_config(ISSUE_PREFIX_KEY, prefix)?;
        tracing::info!(prefix, "initialized issue store");
        Ok(())
    }

    pub fn set_config(&self, key: &str, value: &str) -> Result<(), SqliteStoreError> {
        self.conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_config(&self, key: &str) -> Result<Option<String>, SqliteStoreError> {
        Ok(self
            .conn
            .query_row("SELECT value FROM config WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?)
    }

    pub fn set_custom_statuses<S: AsRef<str>>(&self, names: &[S]) -> Result<(), SqliteStoreError> {
        self.set_config(CUSTOM_STATUSES_KEY, &format_name_list(names))
    }

    pub fn set_custom_types<S: AsRef<str>>(&self, names: &[S]) -> Result<(), SqliteStoreError> {
        self.set_config(CUSTOM_TYPES_KEY, &format_name_list(names))
    }

    pub fn custom_statuses(&self) -> Result<Vec<String>, SqliteStoreError> {
        Ok(self
            .get_config(CUSTOM_STATUSES_KEY)?
            .as_deref()
            .map(parse_name_list)
            .unwrap_or_default())
    }

    pub fn custom_types(&self) -> Result<Vec<String>, SqliteStoreError> {
        Ok(self
            .get_config(CUSTOM_TYPES_KEY)?
            .as_deref()
            .map(parse_name_list)
            .unwrap_or_default())
    }

    /// Handle that aborts a running statement from another thread. The
    /// interrupted statement fails, which aborts the enclosing transaction.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.conn.get_interrupt_handle()
    }

    /// Run `f` inside one `BEGIN IMMEDIATE` transaction.
    ///
    /// Commits when `f` succeeds, rolls back otherwise.
    pub fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut SqliteTx<'_>) -> Result<T, E>,
        E: From<SqliteStoreError>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(SqliteStoreError::from)?;

        let result = f(&mut SqliteTx::new(&tx));
        match result {
            Ok(value) => {
                tx.commit().map_err(SqliteStoreError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback() {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Create or import one issue in its own transaction.
    pub fn create_issue(
        &mut self,
        issue: &mut Issue,
        actor: &str,
        mode: ImportMode,
    ) -> Result<(), CreateError> {
        self.transaction(|tx| Ok(create_or_import(tx, issue, actor, mode)?))
    }

    /// Import `issues` atomically: all of them or none.
    ///
    /// Parents are ingested before their hierarchical children; input order
    /// is otherwise kept. Returns the stored ids in ingestion order.
    pub fn import_batch(
        &mut self,
        issues: Vec<Issue>,
        actor: &str,
        mode: ImportMode,
    ) -> Result<Vec<String>, BatchImportError> {
        let mut ordered: Vec<(usize, Issue)> = issues.into_iter().enumerate().collect();
        ordered.sort_by_key(|(_, issue)| hierarchy_depth(&issue.id));
        let total = ordered.len();

        let result = self.transaction(|tx| {
            let mut ids = Vec::with_capacity(total);
            for (index, issue) in &mut ordered {
                create_or_import(tx, issue, actor, mode).map_err(|source| {
                    BatchImportError::Record {
                        index: *index,
                        id: if issue.id.is_empty() {
                            "<unassigned>".to_string()
                        } else {
                            issue.id.clone()
                        },
                        source,
                    }
                })?;
                ids.push(issue.id.clone());
            }
            Ok(ids)
        });

        match &result {
            Ok(ids) => tracing::info!(count = ids.len(), actor, ?mode, "batch import committed"),
            Err(err) => tracing::warn!(error = %err, total, "batch import rolled back"),
        }
        result
    }

    pub fn get_issue(&self, id: &str) -> Result<Option<Issue>, SqliteStoreError> {
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?1");
        Ok(self.conn.query_row(&sql, [id], issue_from_row).optional()?)
    }

    pub fn issue_exists(&self, id: &str) -> Result<bool, SqliteStoreError> {
        SqliteTx::new(&self.conn).issue_exists(id)
    }

    pub fn count_issues(&self) -> Result<usize, SqliteStoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM issues", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Audit events for one issue, oldest first.
    pub fn events_for(&self, issue_id: &str) -> Result<Vec<IssueEvent>, SqliteStoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT event_id, issue_id, actor, comment, new_value, created_at
             FROM events WHERE issue_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([issue_id], |row| {
            let payload: String = row.get(4)?;
            let action = serde_json::from_str(&payload).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))
            })?;
            Ok(IssueEvent {
                schema: ISSUE_EVENT_SCHEMA.to_string(),
                event_id: row.get(0)?,
                issue_id: row.get(1)?,
                occurred_at: required_timestamp(row, 5)?,
                actor: row.get(2)?,
                comment: row.get(3)?,
                action,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Issue ids waiting for export, in id order.
    pub fn dirty_issue_ids(&self) -> Result<Vec<String>, SqliteStoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT issue_id FROM dirty_issues ORDER BY issue_id")?;
        let ids = stmt.query_map([], |row| row.get(0))?;
        Ok(ids.collect::<Result<_, _>>()?)
    }

    /// When `issue_id` was marked dirty, if a marker is pending.
    pub fn dirty_marked_at(
        &self,
        issue_id: &str,
    ) -> Result<Option<DateTime<Utc>>, SqliteStoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT marked_at FROM dirty_issues WHERE issue_id = ?1",
                [issue_id],
                |row| timestamp(row, 0),
            )
            .optional()?
            .flatten())
    }
}

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|text| {
        DateTime::parse_from_rfc3339(&text)
            .map(|at| at.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn required_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    timestamp(row, idx)?.ok_or(rusqlite::Error::InvalidColumnType(
        idx,
        "timestamp".to_string(),
        Type::Null,
    ))
}

fn issue_from_row(row: &Row<'_>) -> rusqlite::Result<Issue> {
    let metadata: Option<String> = row.get(23)?;
    let metadata = metadata
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(23, Type::Text, Box::new(e))
            })
        })
        .transpose()?;

    Ok(Issue {
        id: row.get(0)?,
        content_hash: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        design: row.get(4)?,
        acceptance_criteria: row.get(5)?,
        notes: row.get(6)?,
        status: Status::from(row.get::<_, String>(7)?),
        priority: row.get(8)?,
        issue_type: IssueType::from(row.get::<_, String>(9)?),
        assignee: row.get(10)?,
        owner: row.get(11)?,
        created_by: row.get(12)?,
        created_at: timestamp(row, 13)?,
        updated_at: timestamp(row, 14)?,
        closed_at: timestamp(row, 15)?,
        close_reason: row.get(16)?,
        deleted_at: timestamp(row, 17)?,
        deleted_by: row.get(18)?,
        delete_reason: row.get(19)?,
        external_ref: row.get(20)?,
        ephemeral: row.get(21)?,
        pinned: row.get(22)?,
        metadata,
        id_prefix: String::new(),
    })
}
