//! Create-or-import: the single ingestion path for one issue.
//!
//! Runs inside a transaction owned by the caller. The routine never begins,
//! commits or rolls back; any error means the caller must roll back, which
//! discards whatever row, event or marker was already written.
//!
//! Pipeline:
//!
//! ```text
//! vocabulary read  →  repair timestamps  →  validate  →  content hash
//!     →  namespace read  →  generate id | check prefix
//!     →  strict insert  →  created event  →  dirty marker
//! ```
//!
//! Parent existence for hierarchical ids is not checked here. Batch
//! importers sort parents before children within one transaction and own
//! the orphan policy; checking here would reject valid imports into an
//! empty store.

use chrono::{DateTime, Utc};
use quarry_kernel::{PrefixError, effective_prefix, validate_issue_id_prefix};

use crate::config::{CUSTOM_STATUSES_KEY, CUSTOM_TYPES_KEY, ISSUE_PREFIX_KEY, parse_name_list};
use crate::events::IssueEvent;
use crate::id_gen::{IdGenerationError, generate_issue_id};
use crate::issue::Issue;
use crate::repair::repair_timestamps;
use crate::validate::{ValidationError, validate_issue};
use crate::vocabulary::Vocabulary;

/// How supplied identifiers are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Supplied ids must live directly under the effective prefix.
    #[default]
    Strict,
    /// Supplied ids are trusted as-is (re-importing previously exported
    /// data). The caller vouches for their consistency.
    TrustedBulk,
}

impl ImportMode {
    pub fn checks_prefix(self) -> bool {
        matches!(self, ImportMode::Strict)
    }
}

/// The unit-of-work surface the ingestion routine writes through.
///
/// Implementations operate on one open transaction; every read must observe
/// writes made earlier through the same value.
pub trait ImportTx {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read one config value.
    fn config_value(&mut self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Current custom status names, read fresh.
    fn custom_statuses(&mut self) -> Result<Vec<String>, Self::Error> {
        let raw = self.config_value(CUSTOM_STATUSES_KEY)?;
        Ok(raw.as_deref().map(parse_name_list).unwrap_or_default())
    }

    /// Current custom issue type names, read fresh.
    fn custom_types(&mut self) -> Result<Vec<String>, Self::Error> {
        let raw = self.config_value(CUSTOM_TYPES_KEY)?;
        Ok(raw.as_deref().map(parse_name_list).unwrap_or_default())
    }

    fn issue_exists(&mut self, id: &str) -> Result<bool, Self::Error>;

    /// Number of non-hierarchical ids directly under `prefix`.
    fn count_top_level_issues(&mut self, prefix: &str) -> Result<usize, Self::Error>;

    /// Insert without overwrite. An existing id must be an error.
    fn insert_issue_strict(&mut self, issue: &Issue) -> Result<(), Self::Error>;

    fn record_event(&mut self, event: &IssueEvent) -> Result<(), Self::Error>;

    /// Flag `issue_id` for the next export, stamped with the ingestion clock.
    fn mark_dirty(&mut self, issue_id: &str, marked_at: DateTime<Utc>) -> Result<(), Self::Error>;
}

/// Errors from [`create_or_import`], one variant per failing phase.
#[derive(Debug, thiserror::Error)]
pub enum ImportError<E> {
    #[error("failed to get custom statuses: {0}")]
    CustomStatuses(#[source] E),

    #[error("failed to get custom types: {0}")]
    CustomTypes(#[source] E),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to get config: {0}")]
    Config(#[source] E),

    #[error(
        "store not initialized: issue_prefix config is missing (run `quarry init --prefix <prefix>` first)"
    )]
    NotInitialized,

    #[error("failed to generate issue ID: {0}")]
    IdGeneration(#[source] IdGenerationError<E>),

    #[error("failed to validate issue ID prefix: {0}")]
    Prefix(#[source] PrefixError),

    #[error("failed to insert issue {id}: {source}")]
    Insert {
        id: String,
        #[source]
        source: E,
    },

    #[error("failed to record creation event for {id}: {source}")]
    RecordEvent {
        id: String,
        #[source]
        source: E,
    },

    #[error("failed to mark issue {id} dirty: {source}")]
    MarkDirty {
        id: String,
        #[source]
        source: E,
    },
}

/// Create (or import) one issue through `tx`, using the current time.
///
/// On success `issue` holds exactly what was stored: repaired timestamps,
/// content hash, and its id.
pub fn create_or_import<T: ImportTx + ?Sized>(
    tx: &mut T,
    issue: &mut Issue,
    actor: &str,
    mode: ImportMode,
) -> Result<(), ImportError<T::Error>> {
    create_or_import_at(tx, issue, actor, mode, Utc::now())
}

/// [`create_or_import`] with an explicit clock.
pub fn create_or_import_at<T: ImportTx + ?Sized>(
    tx: &mut T,
    issue: &mut Issue,
    actor: &str,
    mode: ImportMode,
    now: DateTime<Utc>,
) -> Result<(), ImportError<T::Error>> {
    let custom_statuses = tx.custom_statuses().map_err(ImportError::CustomStatuses)?;
    let custom_types = tx.custom_types().map_err(ImportError::CustomTypes)?;
    let vocabulary = Vocabulary::new(custom_statuses, custom_types);

    let repairs = repair_timestamps(issue, now)?;
    if repairs.any() {
        tracing::debug!(
            issue_id = %issue.id,
            created_at = repairs.created_at,
            updated_at = repairs.updated_at,
            closed_at = repairs.closed_at,
            deleted_at = repairs.deleted_at,
            "repaired issue timestamps"
        );
    }

    validate_issue(issue, &vocabulary)?;

    if issue.content_hash.is_empty() {
        issue.content_hash = issue.compute_content_hash().into_string();
    }

    let base_prefix = match tx
        .config_value(ISSUE_PREFIX_KEY)
        .map_err(ImportError::Config)?
    {
        Some(prefix) if !prefix.trim().is_empty() => prefix,
        _ => return Err(ImportError::NotInitialized),
    };
    let prefix = effective_prefix(&base_prefix, &issue.id_prefix);

    if issue.id.is_empty() {
        let id = generate_issue_id(tx, &prefix, issue, actor, now)
            .map_err(ImportError::IdGeneration)?;
        issue.id = id;
    } else if mode.checks_prefix() {
        validate_issue_id_prefix(&issue.id, &prefix).map_err(ImportError::Prefix)?;
    }

    tx.insert_issue_strict(issue)
        .map_err(|source| ImportError::Insert {
            id: issue.id.clone(),
            source,
        })?;

    let event = IssueEvent::created(issue, actor, now);
    tx.record_event(&event)
        .map_err(|source| ImportError::RecordEvent {
            id: issue.id.clone(),
            source,
        })?;

    tx.mark_dirty(&issue.id, now)
        .map_err(|source| ImportError::MarkDirty {
            id: issue.id.clone(),
            source,
        })?;

    tracing::info!(issue_id = %issue.id, actor, ?mode, "issue created");
    Ok(())
}
