//! # Quarry Kernel
//!
//! Primitives shared by every layer of the issue store:
//!
//! ```text
//! ContentHash           ← deterministic fingerprint of substantive fields
//!     │
//! ContentHashBuilder    ← ordered, length-prefixed `name:len:value` over SHA-256
//!
//! Issue identifiers     ← `<namespace>-<key>`, key = base36 or `key.N.M`
//!     │
//! Namespace rules       ← effective prefix, prefix validation, hierarchy
//! ```
//!
//! Nothing here touches storage. Adapters decide where hashes and
//! identifiers are persisted.

pub mod hash;
pub mod id;

pub use hash::{ContentHash, ContentHashBuilder};
pub use id::{
    PrefixError, effective_prefix, encode_base36, hash_suffix, hierarchy_depth, split_issue_id,
    validate_issue_id_prefix,
};
