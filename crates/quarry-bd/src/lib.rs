//! # quarry-bd
//!
//! Issue layer for the quarry store.
//!
//! This crate provides:
//! - `Issue`, `Status`, `IssueType` (the records being ingested)
//! - timestamp repair and vocabulary validation stages
//! - `create_or_import`: the transactional single-issue ingestion routine,
//!   written against the `ImportTx` unit-of-work trait
//! - transaction-aware hash id generation
//! - JSONL reading for bulk import sources
//! - `MemoryStore`, an in-memory `ImportTx`
//!
//! Durable backends live in adapter crates (`quarry-sqlite`).
//!
//! ## Ingestion
//!
//! ```text
//! caller opens tx
//!     → create_or_import(tx, issue, actor, mode)   (once per issue)
//! caller commits (or rolls back on any error)
//! ```

pub mod config;
pub mod events;
pub mod id_gen;
pub mod import;
pub mod issue;
pub mod jsonl;
pub mod memory;
pub mod repair;
pub mod validate;
pub mod vocabulary;

pub use config::{
    CUSTOM_STATUSES_KEY, CUSTOM_TYPES_KEY, ISSUE_PREFIX_KEY, format_name_list, parse_name_list,
};
pub use events::{ISSUE_EVENT_SCHEMA, IssueEvent, IssueEventAction};
pub use id_gen::{IdGenerationError, adaptive_key_length, generate_issue_id};
pub use import::{ImportError, ImportMode, ImportTx, create_or_import, create_or_import_at};
pub use issue::{Issue, IssueType, Status};
pub use jsonl::{JsonlError, read_issues, read_issues_from_path};
pub use memory::{MemoryStore, MemoryStoreError};
pub use repair::{Repairs, repair_timestamps};
pub use validate::{ValidationError, validate_issue};
pub use vocabulary::Vocabulary;
