use quarry_bd::{ImportMode, Issue};
use quarry_sqlite::SqliteStore;
use serde_json::{Value, json};
use std::fmt::Display;
use std::path::Path;

pub fn exit_with_error(err: impl Display) -> ! {
    eprintln!("error: {err}");
    std::process::exit(1);
}

pub fn open_store_or_exit(db: &Path) -> SqliteStore {
    SqliteStore::open(db).unwrap_or_else(|e| exit_with_error(e))
}

pub fn import_mode(trusted: bool) -> ImportMode {
    if trusted {
        ImportMode::TrustedBulk
    } else {
        ImportMode::Strict
    }
}

pub fn mode_label(mode: ImportMode) -> &'static str {
    match mode {
        ImportMode::Strict => "strict",
        ImportMode::TrustedBulk => "trusted",
    }
}

pub fn print_json(payload: &Value) {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => println!("{text}"),
        Err(e) => exit_with_error(e),
    }
}

fn timestamp(at: Option<chrono::DateTime<chrono::Utc>>) -> Value {
    at.map_or(Value::Null, |t| Value::String(t.to_rfc3339()))
}

/// Compact camelCase summary of an issue.
pub fn issue_json(issue: &Issue) -> Value {
    json!({
        "id": issue.id,
        "title": issue.title,
        "status": issue.status.as_str(),
        "priority": issue.priority,
        "issueType": issue.issue_type.as_str(),
        "assignee": issue.assignee,
        "contentHash": issue.content_hash,
        "createdAt": timestamp(issue.created_at),
        "updatedAt": timestamp(issue.updated_at),
        "closedAt": timestamp(issue.closed_at),
        "deletedAt": timestamp(issue.deleted_at),
    })
}
