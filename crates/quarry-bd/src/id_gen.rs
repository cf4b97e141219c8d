//! Transaction-aware hash identifier generation.
//!
//! Keys are short base36 digests of the issue's title, description, actor,
//! creation instant and a nonce. The key length grows with the number of
//! top-level issues already under the prefix, and every candidate is checked
//! against the caller's transaction, so ids generated earlier in the same
//! transaction are never reused.

use chrono::{DateTime, Utc};
use quarry_kernel::hash_suffix;

use crate::import::ImportTx;
use crate::issue::Issue;

pub const MIN_KEY_LEN: usize = 3;
pub const MAX_KEY_LEN: usize = 8;
pub const NONCES_PER_LENGTH: usize = 10;
/// Highest tolerated birthday-collision probability when picking a length.
pub const MAX_COLLISION_PROBABILITY: f64 = 0.25;

#[derive(Debug, thiserror::Error)]
pub enum IdGenerationError<E> {
    #[error("failed to inspect existing issue IDs: {0}")]
    Backend(#[source] E),

    #[error(
        "failed to generate unique ID under prefix '{prefix}' after trying lengths {min_len}-{max_len} with {nonces} nonces each"
    )]
    Exhausted {
        prefix: String,
        min_len: usize,
        max_len: usize,
        nonces: usize,
    },
}

/// Shortest key length whose collision probability over `existing` ids stays
/// within [`MAX_COLLISION_PROBABILITY`].
pub fn adaptive_key_length(existing: usize) -> usize {
    (MIN_KEY_LEN..=MAX_KEY_LEN)
        .find(|&len| collision_probability(existing, len) <= MAX_COLLISION_PROBABILITY)
        .unwrap_or(MAX_KEY_LEN)
}

fn collision_probability(existing: usize, key_len: usize) -> f64 {
    let space = 36f64.powi(key_len as i32);
    let n = existing as f64;
    1.0 - (-n * n / (2.0 * space)).exp()
}

/// Generate a fresh `<prefix>-<key>` id not yet present in `tx`.
pub fn generate_issue_id<T: ImportTx + ?Sized>(
    tx: &mut T,
    prefix: &str,
    issue: &Issue,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<String, IdGenerationError<T::Error>> {
    let existing = tx
        .count_top_level_issues(prefix)
        .map_err(IdGenerationError::Backend)?;
    let base_len = adaptive_key_length(existing);
    let instant = now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp());

    for len in base_len..=MAX_KEY_LEN {
        for nonce in 0..NONCES_PER_LENGTH {
            let material = format!(
                "{}|{}|{}|{}|{}",
                issue.title, issue.description, actor, instant, nonce
            );
            let candidate = format!("{prefix}-{}", hash_suffix(&material, len));
            if !tx
                .issue_exists(&candidate)
                .map_err(IdGenerationError::Backend)?
            {
                tracing::debug!(id = %candidate, len, nonce, existing, "generated issue id");
                return Ok(candidate);
            }
        }
    }

    Err(IdGenerationError::Exhausted {
        prefix: prefix.to_string(),
        min_len: base_len,
        max_len: MAX_KEY_LEN,
        nonces: NONCES_PER_LENGTH,
    })
}
