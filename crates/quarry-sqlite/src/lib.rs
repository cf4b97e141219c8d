//! SQLite adapter for the quarry issue store.
//!
//! Owns durable storage. Ingestion semantics live in `quarry-bd`; this crate
//! only supplies an [`ImportTx`](quarry_bd::ImportTx) over an open
//! `rusqlite` transaction ([`SqliteTx`]) plus the store-level plumbing around
//! it: schema bootstrap, config, reads, and batch import.

mod error;
mod schema;
mod store;
mod tx;

pub use error::{BatchImportError, CreateError, SqliteStoreError};
pub use schema::{SCHEMA_SQL, apply_schema};
pub use store::SqliteStore;
pub use tx::SqliteTx;
