//! Defensive timestamp repair, run before validation.
//!
//! Every stored row must satisfy `closed ⇒ closed_at` and
//! `tombstone ⇒ deleted_at`, whatever produced the value (hand-built,
//! imported, migrated). Missing timestamps are filled one second after the
//! latest of `created_at`/`updated_at` so they sort strictly after both.

use crate::issue::{Issue, Status};
use crate::validate::ValidationError;
use chrono::{DateTime, TimeDelta, Utc};

/// Which fields [`repair_timestamps`] filled in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Repairs {
    pub created_at: bool,
    pub updated_at: bool,
    pub closed_at: bool,
    pub deleted_at: bool,
}

impl Repairs {
    pub fn any(&self) -> bool {
        self.created_at || self.updated_at || self.closed_at || self.deleted_at
    }
}

/// Fill missing timestamps in place. Present values are never touched, so
/// running this twice is the same as running it once.
///
/// Fails only when a terminal timestamp would land past the end of the
/// representable range.
pub fn repair_timestamps(
    issue: &mut Issue,
    now: DateTime<Utc>,
) -> Result<Repairs, ValidationError> {
    let mut repairs = Repairs::default();

    let created_at = *issue.created_at.get_or_insert_with(|| {
        repairs.created_at = true;
        now
    });
    let updated_at = *issue.updated_at.get_or_insert_with(|| {
        repairs.updated_at = true;
        now
    });
    let latest = created_at.max(updated_at);

    if issue.status == Status::Closed && issue.closed_at.is_none() {
        issue.closed_at = Some(one_second_after(latest, "closed_at")?);
        repairs.closed_at = true;
    }
    if issue.status == Status::Tombstone && issue.deleted_at.is_none() {
        issue.deleted_at = Some(one_second_after(latest, "deleted_at")?);
        repairs.deleted_at = true;
    }

    Ok(repairs)
}

fn one_second_after(
    at: DateTime<Utc>,
    field: &'static str,
) -> Result<DateTime<Utc>, ValidationError> {
    at.checked_add_signed(TimeDelta::seconds(1))
        .ok_or_else(|| ValidationError::TimestampOutOfRange {
            field,
            value: at.to_rfc3339(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .expect("fixture timestamp")
            .with_timezone(&Utc)
    }

    #[test]
    fn defaults_missing_timestamps_to_now() {
        let now = at("2025-06-01T12:00:00Z");
        let mut issue = Issue::draft("t");
        let repairs = repair_timestamps(&mut issue, now).expect("repair");
        assert_eq!(issue.created_at, Some(now));
        assert_eq!(issue.updated_at, Some(now));
        assert!(repairs.created_at && repairs.updated_at);
        assert!(!repairs.closed_at && !repairs.deleted_at);
    }

    #[test]
    fn preserves_historical_timestamps() {
        let created = at("2020-01-01T00:00:00Z");
        let updated = at("2021-01-01T00:00:00Z");
        let mut issue = Issue::draft("t");
        issue.created_at = Some(created);
        issue.updated_at = Some(updated);

        let repairs = repair_timestamps(&mut issue, at("2025-06-01T12:00:00Z")).expect("repair");
        assert_eq!(issue.created_at, Some(created));
        assert_eq!(issue.updated_at, Some(updated));
        assert!(!repairs.any());
    }

    #[test]
    fn closed_without_closed_at_gets_latest_plus_one_second() {
        let t = at("2024-03-04T05:06:07Z");
        let mut issue = Issue::draft("t");
        issue.status = Status::Closed;
        issue.created_at = Some(t);
        issue.updated_at = Some(t);

        let repairs = repair_timestamps(&mut issue, at("2025-01-01T00:00:00Z")).expect("repair");
        assert!(repairs.closed_at);
        assert_eq!(issue.closed_at, Some(t + TimeDelta::seconds(1)));
    }

    #[test]
    fn closed_at_follows_the_later_of_created_and_updated() {
        let created = at("2024-03-04T05:06:07Z");
        let updated = at("2024-05-01T00:00:00Z");
        let mut issue = Issue::draft("t");
        issue.status = Status::Closed;
        issue.created_at = Some(created);
        issue.updated_at = Some(updated);

        repair_timestamps(&mut issue, at("2025-01-01T00:00:00Z")).expect("repair");
        assert_eq!(issue.closed_at, Some(updated + TimeDelta::seconds(1)));

        // created after updated (clock skew in the source feed)
        let mut skewed = Issue::draft("t");
        skewed.status = Status::Closed;
        skewed.created_at = Some(updated);
        skewed.updated_at = Some(created);
        repair_timestamps(&mut skewed, at("2025-01-01T00:00:00Z")).expect("repair");
        assert_eq!(skewed.closed_at, Some(updated + TimeDelta::seconds(1)));
    }

    #[test]
    fn tombstone_without_deleted_at_is_repaired() {
        let t = at("2024-03-04T05:06:07Z");
        let mut issue = Issue::draft("t");
        issue.status = Status::Tombstone;
        issue.created_at = Some(t);
        issue.updated_at = Some(t);

        let repairs = repair_timestamps(&mut issue, at("2025-01-01T00:00:00Z")).expect("repair");
        assert!(repairs.deleted_at);
        assert_eq!(issue.deleted_at, Some(t + TimeDelta::seconds(1)));
        assert_eq!(issue.closed_at, None);
    }

    #[test]
    fn existing_closed_at_is_kept_and_repair_is_idempotent() {
        let t = at("2024-03-04T05:06:07Z");
        let closed = at("2024-03-04T06:00:00Z");
        let mut issue = Issue::draft("t");
        issue.status = Status::Closed;
        issue.created_at = Some(t);
        issue.updated_at = Some(t);
        issue.closed_at = Some(closed);

        repair_timestamps(&mut issue, at("2025-01-01T00:00:00Z")).expect("repair");
        assert_eq!(issue.closed_at, Some(closed));

        let once = issue.clone();
        let repairs = repair_timestamps(&mut issue, at("2026-01-01T00:00:00Z")).expect("repair");
        assert_eq!(issue, once);
        assert!(!repairs.any());
    }

    #[test]
    fn open_issue_is_left_without_terminal_timestamps() {
        let mut issue = Issue::draft("t");
        repair_timestamps(&mut issue, at("2025-01-01T00:00:00Z")).expect("repair");
        assert_eq!(issue.closed_at, None);
        assert_eq!(issue.deleted_at, None);
    }

    #[test]
    fn open_issue_at_the_end_of_time_is_not_shifted() {
        let mut issue = Issue::draft("t");
        issue.created_at = Some(DateTime::<Utc>::MAX_UTC);
        issue.updated_at = Some(DateTime::<Utc>::MAX_UTC);
        let repairs = repair_timestamps(&mut issue, at("2025-01-01T00:00:00Z")).expect("repair");
        assert!(!repairs.any());
        assert_eq!(issue.closed_at, None);
    }

    #[test]
    fn closed_at_past_the_representable_range_is_an_error() {
        let mut issue = Issue::draft("t");
        issue.status = Status::Closed;
        issue.created_at = Some(DateTime::<Utc>::MAX_UTC);
        issue.updated_at = Some(at("2025-01-01T00:00:00Z"));

        let err = repair_timestamps(&mut issue, at("2025-01-01T00:00:00Z"))
            .expect_err("no room for closed_at");
        assert!(matches!(
            err,
            ValidationError::TimestampOutOfRange { field: "closed_at", .. }
        ));
        assert_eq!(issue.closed_at, None);

        let mut tombstone = Issue::draft("t");
        tombstone.status = Status::Tombstone;
        tombstone.created_at = Some(DateTime::<Utc>::MAX_UTC);
        tombstone.updated_at = Some(DateTime::<Utc>::MAX_UTC);
        let err = repair_timestamps(&mut tombstone, at("2025-01-01T00:00:00Z"))
            .expect_err("no room for deleted_at");
        assert!(matches!(
            err,
            ValidationError::TimestampOutOfRange { field: "deleted_at", .. }
        ));
    }
}
