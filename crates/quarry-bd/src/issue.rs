//! Issue type: the unit of work ingested by the store.

use chrono::{DateTime, Utc};
use quarry_kernel::ContentHash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An issue: a trackable work item.
///
/// `created_at`/`updated_at` are optional on the way in so that drafts can
/// leave them unset; every persisted issue carries both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    // ── Core identification ──
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_hash: String,

    // ── Content ──
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub design: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub acceptance_criteria: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    // ── Status & workflow ──
    #[serde(default)]
    pub status: Status,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub issue_type: IssueType,

    // ── Assignment ──
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub assignee: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_by: String,

    // ── Timestamps ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub close_reason: String,

    // ── Tombstone ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deleted_by: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub delete_reason: String,

    // ── External linkage ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,

    // ── Flags ──
    #[serde(default)]
    pub ephemeral: bool,
    #[serde(default)]
    pub pinned: bool,

    // ── Custom metadata ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    /// Sub-namespace token for multi-repo import. Never persisted.
    #[serde(skip)]
    pub id_prefix: String,
}

fn default_priority() -> i32 {
    2
}

impl Issue {
    /// Construct a minimal open task.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_hash: String::new(),
            title: title.into(),
            description: String::new(),
            design: String::new(),
            acceptance_criteria: String::new(),
            notes: String::new(),
            status: Status::Open,
            priority: default_priority(),
            issue_type: IssueType::Task,
            assignee: String::new(),
            owner: String::new(),
            created_by: String::new(),
            created_at: None,
            updated_at: None,
            closed_at: None,
            close_reason: String::new(),
            deleted_at: None,
            deleted_by: String::new(),
            delete_reason: String::new(),
            external_ref: None,
            ephemeral: false,
            pinned: false,
            metadata: None,
            id_prefix: String::new(),
        }
    }

    /// An issue without an ID, to be assigned one on ingestion.
    pub fn draft(title: impl Into<String>) -> Self {
        Self::new(String::new(), title)
    }

    /// Compute the content hash of substantive fields.
    ///
    /// Frozen scheme (version 2, length-prefixed fields). Field order:
    /// title, description, design, acceptance_criteria, notes, status,
    /// priority, issue_type, assignee, owner, created_by, external_ref (only
    /// when present), close_reason, ephemeral, pinned.
    ///
    /// Excludes: id, timestamps, deletion bookkeeping, metadata.
    pub fn compute_content_hash(&self) -> ContentHash {
        ContentHash::builder()
            .field("title", &self.title)
            .field("description", &self.description)
            .field("design", &self.design)
            .field("acceptance_criteria", &self.acceptance_criteria)
            .field("notes", &self.notes)
            .field("status", self.status.as_str())
            .field_int("priority", i64::from(self.priority))
            .field("issue_type", self.issue_type.as_str())
            .field("assignee", &self.assignee)
            .field("owner", &self.owner)
            .field("created_by", &self.created_by)
            .field_opt("external_ref", self.external_ref.as_deref())
            .field("close_reason", &self.close_reason)
            .field_bool("ephemeral", self.ephemeral)
            .field_bool("pinned", self.pinned)
            .finish()
    }
}

/// Issue status. Unknown names are carried as `Custom` and checked against
/// the store's vocabulary at ingestion time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Blocked,
    Deferred,
    Closed,
    Tombstone,
    Pinned,
    Custom(String),
}

impl Status {
    pub const BUILTIN: [Status; 7] = [
        Status::Open,
        Status::InProgress,
        Status::Blocked,
        Status::Deferred,
        Status::Closed,
        Status::Tombstone,
        Status::Pinned,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Status::Open => "open",
            Status::InProgress => "in_progress",
            Status::Blocked => "blocked",
            Status::Deferred => "deferred",
            Status::Closed => "closed",
            Status::Tombstone => "tombstone",
            Status::Pinned => "pinned",
            Status::Custom(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Status::Custom(_))
    }
}

impl From<&str> for Status {
    fn from(value: &str) -> Self {
        match value {
            "open" => Status::Open,
            "in_progress" => Status::InProgress,
            "blocked" => Status::Blocked,
            "deferred" => Status::Deferred,
            "closed" => Status::Closed,
            "tombstone" => Status::Tombstone,
            "pinned" => Status::Pinned,
            other => Status::Custom(other.to_string()),
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        Status::from(value.as_str())
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        match value {
            Status::Custom(name) => name,
            builtin => builtin.as_str().to_string(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue type classification. Unknown names are carried as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueType {
    Bug,
    Feature,
    #[default]
    Task,
    Epic,
    Chore,
    Custom(String),
}

impl IssueType {
    pub const BUILTIN: [IssueType; 5] = [
        IssueType::Bug,
        IssueType::Feature,
        IssueType::Task,
        IssueType::Epic,
        IssueType::Chore,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            IssueType::Bug => "bug",
            IssueType::Feature => "feature",
            IssueType::Task => "task",
            IssueType::Epic => "epic",
            IssueType::Chore => "chore",
            IssueType::Custom(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, IssueType::Custom(_))
    }
}

impl From<&str> for IssueType {
    fn from(value: &str) -> Self {
        match value {
            "bug" => IssueType::Bug,
            "feature" => IssueType::Feature,
            "task" => IssueType::Task,
            "epic" => IssueType::Epic,
            "chore" => IssueType::Chore,
            other => IssueType::Custom(other.to_string()),
        }
    }
}

impl From<String> for IssueType {
    fn from(value: String) -> Self {
        IssueType::from(value.as_str())
    }
}

impl From<IssueType> for String {
    fn from(value: IssueType) -> Self {
        match value {
            IssueType::Custom(name) => name,
            builtin => builtin.as_str().to_string(),
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
