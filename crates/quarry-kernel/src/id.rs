//! Issue identifiers and namespace rules.
//!
//! An identifier is `<namespace>-<key>`. The namespace is everything before
//! the last `-` (so namespaces may themselves contain dashes, e.g. a
//! multi-repo `PROJ-web`). The key is alphanumeric, optionally followed by
//! dotted child ordinals for hierarchical issues: `PROJ-a3f8.1.2`.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn issue_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9A-Za-z]+(?:\.[0-9]+)*$").expect("issue key regex must compile")
    })
}

/// Errors from identifier namespace validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrefixError {
    #[error("issue ID '{id}' is malformed: expected <prefix>-<key>")]
    Malformed { id: String },

    #[error("issue ID '{id}' does not match configured prefix '{expected}' (found '{actual}')")]
    Mismatch {
        id: String,
        expected: String,
        actual: String,
    },
}

/// Root a sub-namespace token under the base namespace.
///
/// An empty token leaves the base untouched.
pub fn effective_prefix(base: &str, sub_namespace: &str) -> String {
    if sub_namespace.is_empty() {
        base.to_string()
    } else {
        format!("{base}-{sub_namespace}")
    }
}

/// Split an identifier into `(namespace, key)`.
///
/// Returns `None` when there is no dash, the namespace is empty, or the key
/// is not a well-formed (possibly hierarchical) key.
pub fn split_issue_id(id: &str) -> Option<(&str, &str)> {
    let (prefix, key) = id.rsplit_once('-')?;
    if prefix.is_empty() || !issue_key_re().is_match(key) {
        return None;
    }
    Some((prefix, key))
}

/// Check that `id` lives directly under `expected_prefix`.
pub fn validate_issue_id_prefix(id: &str, expected_prefix: &str) -> Result<(), PrefixError> {
    let (actual, _) = split_issue_id(id).ok_or_else(|| PrefixError::Malformed { id: id.into() })?;
    if actual != expected_prefix {
        return Err(PrefixError::Mismatch {
            id: id.to_string(),
            expected: expected_prefix.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

/// Number of hierarchy levels below a top-level id. Malformed ids count as 0.
pub fn hierarchy_depth(id: &str) -> usize {
    split_issue_id(id)
        .map(|(_, key)| key.matches('.').count())
        .unwrap_or(0)
}

/// Short base36 key derived from `material`.
///
/// Takes the leading bytes of SHA-256(material), enough to cover `len`
/// base36 digits, and renders them with [`encode_base36`].
pub fn hash_suffix(material: &str, len: usize) -> String {
    let digest = Sha256::digest(material.as_bytes());
    let num_bytes = match len {
        3 => 2,
        4 => 3,
        5 | 6 => 4,
        7 | 8 => 5,
        _ => 3,
    };
    encode_base36(&digest[..num_bytes], len)
}

/// Big-endian base36 rendering, left-padded with `0` and truncated to the
/// last `len` digits.
pub fn encode_base36(bytes: &[u8], len: usize) -> String {
    let mut num: u64 = 0;
    for &b in bytes.iter().take(8) {
        num = (num << 8) | u64::from(b);
    }

    let mut digits = Vec::new();
    while num > 0 {
        digits.push(BASE36_ALPHABET[(num % 36) as usize]);
        num /= 36;
    }
    while digits.len() < len {
        digits.push(b'0');
    }
    digits.truncate(len);
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
