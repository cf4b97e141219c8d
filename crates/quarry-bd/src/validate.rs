//! Structural and vocabulary validation for issues about to be stored.

use crate::issue::{Issue, Status};
use crate::vocabulary::Vocabulary;
use chrono::{DateTime, Datelike, Utc};

pub const MAX_TITLE_CHARS: usize = 500;
pub const MIN_PRIORITY: i32 = 0;
pub const MAX_PRIORITY: i32 = 4;
/// Stored timestamps are RFC 3339, which only spells four-digit years.
pub const MAX_TIMESTAMP_YEAR: i32 = 9999;

/// A violated field rule. The message always names the field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    TitleRequired,

    #[error("title must be 500 characters or less (got {0})")]
    TitleTooLong(usize),

    #[error("priority must be between 0 and 4 (got {0})")]
    PriorityOutOfRange(i32),

    #[error("invalid status: {0}")]
    UnknownStatus(String),

    #[error("invalid issue_type: {0}")]
    UnknownType(String),

    #[error("closed issues must have closed_at timestamp")]
    ClosedWithoutClosedAt,

    #[error("non-closed issues cannot have closed_at timestamp (status: {0})")]
    ClosedAtOnOpenIssue(String),

    #[error("tombstone issues must have deleted_at timestamp")]
    TombstoneWithoutDeletedAt,

    #[error("non-tombstone issues cannot have deleted_at timestamp (status: {0})")]
    DeletedAtOnLiveIssue(String),

    #[error("{field} must fall within years 0000-9999 (got {value})")]
    TimestampOutOfRange { field: &'static str, value: String },
}

/// Check `issue` against structural rules and the given vocabulary.
///
/// Reports the first violation in field order.
pub fn validate_issue(issue: &Issue, vocabulary: &Vocabulary) -> Result<(), ValidationError> {
    let title_chars = issue.title.chars().count();
    if title_chars == 0 {
        return Err(ValidationError::TitleRequired);
    }
    if title_chars > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong(title_chars));
    }

    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&issue.priority) {
        return Err(ValidationError::PriorityOutOfRange(issue.priority));
    }

    if !vocabulary.allows_status(&issue.status) {
        return Err(ValidationError::UnknownStatus(issue.status.to_string()));
    }
    if !vocabulary.allows_type(&issue.issue_type) {
        return Err(ValidationError::UnknownType(issue.issue_type.to_string()));
    }

    for (field, at) in [
        ("created_at", issue.created_at),
        ("updated_at", issue.updated_at),
        ("closed_at", issue.closed_at),
        ("deleted_at", issue.deleted_at),
    ] {
        if let Some(at) = at {
            check_timestamp_range(field, at)?;
        }
    }

    match (&issue.status, issue.closed_at) {
        (Status::Closed, None) => return Err(ValidationError::ClosedWithoutClosedAt),
        (Status::Closed | Status::Tombstone, _) | (_, None) => {}
        (other, Some(_)) => return Err(ValidationError::ClosedAtOnOpenIssue(other.to_string())),
    }

    match (&issue.status, issue.deleted_at) {
        (Status::Tombstone, None) => Err(ValidationError::TombstoneWithoutDeletedAt),
        (Status::Tombstone, Some(_)) | (_, None) => Ok(()),
        (other, Some(_)) => Err(ValidationError::DeletedAtOnLiveIssue(other.to_string())),
    }
}

fn check_timestamp_range(field: &'static str, at: DateTime<Utc>) -> Result<(), ValidationError> {
    if (0..=MAX_TIMESTAMP_YEAR).contains(&at.year()) {
        Ok(())
    } else {
        Err(ValidationError::TimestampOutOfRange {
            field,
            value: at.to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueType;
    use chrono::TimeDelta;

    fn valid() -> Issue {
        let mut issue = Issue::new("bd-1", "Valid");
        issue.created_at = Some(Utc::now());
        issue.updated_at = issue.created_at;
        issue
    }

    #[test]
    fn accepts_a_plain_open_issue() {
        assert_eq!(validate_issue(&valid(), &Vocabulary::default()), Ok(()));
    }

    #[test]
    fn title_rules() {
        let mut issue = valid();
        issue.title.clear();
        assert_eq!(
            validate_issue(&issue, &Vocabulary::default()),
            Err(ValidationError::TitleRequired)
        );

        issue.title = "x".repeat(MAX_TITLE_CHARS + 1);
        assert_eq!(
            validate_issue(&issue, &Vocabulary::default()),
            Err(ValidationError::TitleTooLong(MAX_TITLE_CHARS + 1))
        );

        // Length counts characters, not bytes.
        issue.title = "é".repeat(MAX_TITLE_CHARS);
        assert_eq!(validate_issue(&issue, &Vocabulary::default()), Ok(()));
    }

    #[test]
    fn priority_range() {
        let mut issue = valid();
        issue.priority = 5;
        assert_eq!(
            validate_issue(&issue, &Vocabulary::default()),
            Err(ValidationError::PriorityOutOfRange(5))
        );
        issue.priority = -1;
        assert!(validate_issue(&issue, &Vocabulary::default()).is_err());
    }

    #[test]
    fn custom_status_and_type_need_vocabulary() {
        let mut issue = valid();
        issue.status = Status::from("review");
        issue.issue_type = IssueType::from("spike");

        let err = validate_issue(&issue, &Vocabulary::default()).expect_err("unknown status");
        assert_eq!(err, ValidationError::UnknownStatus("review".to_string()));
        assert!(err.to_string().contains("status"));

        let statuses_only = Vocabulary::new(vec!["review".to_string()], Vec::new());
        assert_eq!(
            validate_issue(&issue, &statuses_only),
            Err(ValidationError::UnknownType("spike".to_string()))
        );

        let both = Vocabulary::new(vec!["review".to_string()], vec!["spike".to_string()]);
        assert_eq!(validate_issue(&issue, &both), Ok(()));
    }

    #[test]
    fn closed_at_invariants() {
        let mut issue = valid();
        issue.status = Status::Closed;
        assert_eq!(
            validate_issue(&issue, &Vocabulary::default()),
            Err(ValidationError::ClosedWithoutClosedAt)
        );

        issue.closed_at = Some(Utc::now());
        assert_eq!(validate_issue(&issue, &Vocabulary::default()), Ok(()));

        issue.status = Status::Open;
        assert_eq!(
            validate_issue(&issue, &Vocabulary::default()),
            Err(ValidationError::ClosedAtOnOpenIssue("open".to_string()))
        );
    }

    #[test]
    fn deleted_at_invariants() {
        let mut issue = valid();
        issue.status = Status::Tombstone;
        assert_eq!(
            validate_issue(&issue, &Vocabulary::default()),
            Err(ValidationError::TombstoneWithoutDeletedAt)
        );

        issue.deleted_at = Some(Utc::now());
        // A tombstone may keep the closed_at it had before deletion.
        issue.closed_at = Some(Utc::now());
        assert_eq!(validate_issue(&issue, &Vocabulary::default()), Ok(()));

        issue.status = Status::Closed;
        assert_eq!(
            validate_issue(&issue, &Vocabulary::default()),
            Err(ValidationError::DeletedAtOnLiveIssue("closed".to_string()))
        );
    }

    #[test]
    fn timestamps_must_stay_within_four_digit_years() {
        let last_second = DateTime::parse_from_rfc3339("9999-12-31T23:59:59Z")
            .expect("fixture timestamp")
            .with_timezone(&Utc);
        let mut issue = valid();
        issue.created_at = Some(last_second);
        issue.updated_at = Some(last_second);
        assert_eq!(validate_issue(&issue, &Vocabulary::default()), Ok(()));

        issue.status = Status::Closed;
        issue.closed_at = Some(last_second + TimeDelta::seconds(1));
        let err = validate_issue(&issue, &Vocabulary::default()).expect_err("year 10000");
        assert!(matches!(
            err,
            ValidationError::TimestampOutOfRange { field: "closed_at", .. }
        ));
        assert!(err.to_string().contains("closed_at"));

        let mut ancient = valid();
        ancient.created_at = Some(DateTime::<Utc>::MIN_UTC);
        assert!(matches!(
            validate_issue(&ancient, &Vocabulary::default()),
            Err(ValidationError::TimestampOutOfRange { field: "created_at", .. })
        ));
    }
}
