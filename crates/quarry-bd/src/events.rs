//! Audit events emitted by issue ingestion.
//!
//! `issue.event.v1` envelopes are append-only: one `created` event per
//! successfully inserted issue, carrying a snapshot of the stored value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::issue::Issue;

pub const ISSUE_EVENT_SCHEMA: &str = "issue.event.v1";

fn default_issue_event_schema() -> String {
    ISSUE_EVENT_SCHEMA.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum IssueEventAction {
    Created { issue: Issue },
}

impl IssueEventAction {
    /// Stable event-type name used by storage backends.
    pub fn kind(&self) -> &'static str {
        match self {
            IssueEventAction::Created { .. } => "created",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueEvent {
    #[serde(default = "default_issue_event_schema")]
    pub schema: String,
    pub event_id: String,
    pub issue_id: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub action: IssueEventAction,
}

impl IssueEvent {
    /// The creation event for a freshly stored issue.
    pub fn created(issue: &Issue, actor: &str, occurred_at: DateTime<Utc>) -> Self {
        Self {
            schema: ISSUE_EVENT_SCHEMA.to_string(),
            event_id: Uuid::new_v4().to_string(),
            issue_id: issue.id.clone(),
            occurred_at,
            actor: actor.to_string(),
            comment: Some(format!("Created issue: {}", issue.title)),
            action: IssueEventAction::Created {
                issue: issue.clone(),
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        self.action.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_event_snapshots_the_issue() {
        let issue = Issue::new("bd-a", "Snapshot me");
        let event = IssueEvent::created(&issue, "alice", Utc::now());
        assert_eq!(event.issue_id, "bd-a");
        assert_eq!(event.kind(), "created");
        assert_eq!(event.actor, "alice");
        assert!(Uuid::parse_str(&event.event_id).is_ok());
        match &event.action {
            IssueEventAction::Created { issue: snapshot } => assert_eq!(snapshot, &issue),
        }
    }

    #[test]
    fn event_ids_are_unique_per_event() {
        let issue = Issue::new("bd-a", "Twice");
        let now = Utc::now();
        assert_ne!(
            IssueEvent::created(&issue, "a", now).event_id,
            IssueEvent::created(&issue, "a", now).event_id
        );
    }

    #[test]
    fn envelope_serializes_with_action_tag() {
        let issue = Issue::new("bd-a", "Tagged");
        let event = IssueEvent::created(&issue, "alice", Utc::now());
        let value = serde_json::to_value(&event).expect("event serializes");
        assert_eq!(value["schema"], ISSUE_EVENT_SCHEMA);
        assert_eq!(value["action"], "created");
        assert_eq!(value["issue"]["id"], "bd-a");

        let parsed: IssueEvent = serde_json::from_value(value).expect("event parses");
        assert_eq!(parsed, event);
    }
}
