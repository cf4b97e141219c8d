//! Status and type vocabulary: built-in names plus the store's custom sets.

use crate::issue::{IssueType, Status};
use std::collections::BTreeSet;

/// The union of built-in and custom status/type names for one ingestion.
///
/// Built fresh from the backend on every call; never cached across calls
/// since custom sets may change between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    custom_statuses: BTreeSet<String>,
    custom_types: BTreeSet<String>,
}

impl Vocabulary {
    pub fn new(
        custom_statuses: impl IntoIterator<Item = String>,
        custom_types: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            custom_statuses: custom_statuses.into_iter().collect(),
            custom_types: custom_types.into_iter().collect(),
        }
    }

    pub fn allows_status(&self, status: &Status) -> bool {
        status.is_builtin() || self.custom_statuses.contains(status.as_str())
    }

    pub fn allows_type(&self, issue_type: &IssueType) -> bool {
        issue_type.is_builtin() || self.custom_types.contains(issue_type.as_str())
    }

    /// All accepted status names: built-ins first, then custom (sorted).
    pub fn status_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Status::BUILTIN
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        let extra: Vec<String> = self
            .custom_statuses
            .iter()
            .filter(|name| !names.contains(name))
            .cloned()
            .collect();
        names.extend(extra);
        names
    }

    /// All accepted type names: built-ins first, then custom (sorted).
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = IssueType::BUILTIN
            .iter()
            .map(|t| t.as_str().to_string())
            .collect();
        let extra: Vec<String> = self
            .custom_types
            .iter()
            .filter(|name| !names.contains(name))
            .cloned()
            .collect();
        names.extend(extra);
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_always_allowed() {
        let vocab = Vocabulary::default();
        assert!(vocab.allows_status(&Status::Tombstone));
        assert!(vocab.allows_type(&IssueType::Epic));
        assert!(!vocab.allows_status(&Status::from("review")));
        assert!(!vocab.allows_type(&IssueType::from("spike")));
    }

    #[test]
    fn custom_names_extend_the_vocabulary() {
        let vocab = Vocabulary::new(vec!["review".to_string()], vec!["spike".to_string()]);
        assert!(vocab.allows_status(&Status::from("review")));
        assert!(vocab.allows_type(&IssueType::from("spike")));
        assert!(!vocab.allows_status(&Status::from("qa")));

        let statuses = vocab.status_names();
        assert_eq!(statuses.first().map(String::as_str), Some("open"));
        assert_eq!(statuses.last().map(String::as_str), Some("review"));
    }
}
