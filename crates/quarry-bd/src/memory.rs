//! In-memory issue store implementing [`ImportTx`].
//!
//! Deterministic (BTreeMap-ordered) and dependency-free. Transactions are
//! snapshot/restore: [`MemoryStore::transaction`] clones the state, runs the
//! closure, and restores the snapshot if it fails.

use crate::config::{CUSTOM_STATUSES_KEY, CUSTOM_TYPES_KEY, ISSUE_PREFIX_KEY, format_name_list};
use crate::events::IssueEvent;
use crate::import::ImportTx;
use crate::issue::Issue;
use chrono::{DateTime, Utc};
use quarry_kernel::split_issue_id;
use std::collections::BTreeMap;

/// Errors raised by the memory store.
#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("issue already exists: {0}")]
    IssueAlreadyExists(String),

    #[error("issue not found: {0}")]
    IssueNotFound(String),
}

/// Canonical in-memory state: issues, config, audit events, dirty markers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    issues: BTreeMap<String, Issue>,
    config: BTreeMap<String, String>,
    events: Vec<IssueEvent>,
    dirty: BTreeMap<String, DateTime<Utc>>,
}

impl MemoryStore {
    /// An empty store with `issue_prefix` configured.
    pub fn with_prefix(prefix: &str) -> Self {
        let mut store = Self::default();
        store.set_config(ISSUE_PREFIX_KEY, prefix);
        store
    }

    pub fn set_config(&mut self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    pub fn config(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    pub fn set_custom_statuses<S: AsRef<str>>(&mut self, names: &[S]) {
        self.set_config(CUSTOM_STATUSES_KEY, &format_name_list(names));
    }

    pub fn set_custom_types<S: AsRef<str>>(&mut self, names: &[S]) {
        self.set_config(CUSTOM_TYPES_KEY, &format_name_list(names));
    }

    /// Total number of issues in memory.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Whether the store has zero issues.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Lookup one issue by ID.
    pub fn issue(&self, id: &str) -> Option<&Issue> {
        self.issues.get(id)
    }

    /// Insert or replace an issue by ID, bypassing ingestion.
    ///
    /// Returns previous value if present.
    pub fn upsert_issue(&mut self, issue: Issue) -> Option<Issue> {
        self.issues.insert(issue.id.clone(), issue)
    }

    /// Iterate all issues in deterministic ID order.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.values()
    }

    /// Audit events in append order.
    pub fn events(&self) -> &[IssueEvent] {
        &self.events
    }

    pub fn events_for<'a>(&'a self, issue_id: &'a str) -> impl Iterator<Item = &'a IssueEvent> {
        self.events.iter().filter(move |e| e.issue_id == issue_id)
    }

    /// IDs with a pending dirty marker, in ID order.
    pub fn dirty_ids(&self) -> Vec<String> {
        self.dirty.keys().cloned().collect()
    }

    /// When `issue_id` was last marked dirty, if it is pending.
    pub fn dirty_marked_at(&self, issue_id: &str) -> Option<DateTime<Utc>> {
        self.dirty.get(issue_id).copied()
    }

    /// Run `f` against this store; on error, restore the state from before.
    pub fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut MemoryStore) -> Result<T, E>,
    {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }
}

impl ImportTx for MemoryStore {
    type Error = MemoryStoreError;

    fn config_value(&mut self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.config.get(key).cloned())
    }

    fn issue_exists(&mut self, id: &str) -> Result<bool, Self::Error> {
        Ok(self.issues.contains_key(id))
    }

    fn count_top_level_issues(&mut self, prefix: &str) -> Result<usize, Self::Error> {
        Ok(self
            .issues
            .keys()
            .filter_map(|id| split_issue_id(id))
            .filter(|(p, key)| *p == prefix && !key.contains('.'))
            .count())
    }

    fn insert_issue_strict(&mut self, issue: &Issue) -> Result<(), Self::Error> {
        if self.issues.contains_key(&issue.id) {
            return Err(MemoryStoreError::IssueAlreadyExists(issue.id.clone()));
        }
        self.issues.insert(issue.id.clone(), issue.clone());
        Ok(())
    }

    fn record_event(&mut self, event: &IssueEvent) -> Result<(), Self::Error> {
        if !self.issues.contains_key(&event.issue_id) {
            return Err(MemoryStoreError::IssueNotFound(event.issue_id.clone()));
        }
        self.events.push(event.clone());
        Ok(())
    }

    fn mark_dirty(
        &mut self,
        issue_id: &str,
        marked_at: DateTime<Utc>,
    ) -> Result<(), Self::Error> {
        if !self.issues.contains_key(issue_id) {
            return Err(MemoryStoreError::IssueNotFound(issue_id.to_string()));
        }
        self.dirty.insert(issue_id.to_string(), marked_at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_insert_rejects_duplicates() {
        let mut store = MemoryStore::default();
        store
            .insert_issue_strict(&Issue::new("bd-a", "first"))
            .expect("first insert should succeed");
        let err = store
            .insert_issue_strict(&Issue::new("bd-a", "second"))
            .expect_err("duplicate insert must error");
        assert!(matches!(err, MemoryStoreError::IssueAlreadyExists(id) if id == "bd-a"));
        assert_eq!(
            store.issue("bd-a").map(|issue| issue.title.as_str()),
            Some("first")
        );
    }

    #[test]
    fn top_level_count_ignores_children_and_other_namespaces() {
        let mut store = MemoryStore::default();
        for id in ["bd-a", "bd-b", "bd-a.1", "bd-web-c", "other-d"] {
            store.upsert_issue(Issue::new(id, "t"));
        }
        assert_eq!(store.count_top_level_issues("bd").expect("count"), 2);
        assert_eq!(store.count_top_level_issues("bd-web").expect("count"), 1);
    }

    #[test]
    fn transaction_restores_state_on_error() {
        let mut store = MemoryStore::with_prefix("bd");
        let result: Result<(), MemoryStoreError> = store.transaction(|tx| {
            tx.insert_issue_strict(&Issue::new("bd-a", "t"))?;
            tx.mark_dirty("bd-a", Utc::now())?;
            tx.insert_issue_strict(&Issue::new("bd-a", "again"))
        });
        assert!(result.is_err());
        assert!(store.is_empty());
        assert!(store.dirty_ids().is_empty());
    }

    #[test]
    fn transaction_keeps_state_on_success() {
        let mut store = MemoryStore::default();
        store
            .transaction(|tx| tx.insert_issue_strict(&Issue::new("bd-a", "t")))
            .expect("transaction should commit");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn custom_vocabulary_is_read_through_config() {
        let mut store = MemoryStore::default();
        store.set_custom_statuses(&["review", "qa"]);
        store.set_custom_types(&["spike"]);
        assert_eq!(
            store.custom_statuses().expect("statuses"),
            vec!["review".to_string(), "qa".to_string()]
        );
        assert_eq!(store.custom_types().expect("types"), vec!["spike".to_string()]);
        assert_eq!(store.config(CUSTOM_STATUSES_KEY), Some("review,qa"));
    }
}
