use crate::support::{exit_with_error, open_store_or_exit, print_json};
use serde_json::json;
use std::path::Path;

pub fn run(db: &Path, id: &str, json_output: bool) {
    let store = open_store_or_exit(db);
    let issue = store
        .get_issue(id)
        .unwrap_or_else(|e| exit_with_error(e))
        .unwrap_or_else(|| exit_with_error(format!("issue not found: {id}")));

    if json_output {
        let issue = serde_json::to_value(&issue).unwrap_or_else(|e| exit_with_error(e));
        print_json(&json!({
            "action": "show",
            "issue": issue,
        }));
        return;
    }

    println!("{}: {}", issue.id, issue.title);
    println!(
        "  Status: {}  Priority: {}  Type: {}",
        issue.status, issue.priority, issue.issue_type
    );
    if !issue.assignee.is_empty() {
        println!("  Assignee: {}", issue.assignee);
    }
    if let Some(created) = issue.created_at {
        println!("  Created: {}", created.to_rfc3339());
    }
    if let Some(updated) = issue.updated_at {
        println!("  Updated: {}", updated.to_rfc3339());
    }
    if let Some(closed) = issue.closed_at {
        println!("  Closed: {}", closed.to_rfc3339());
    }
    if let Some(deleted) = issue.deleted_at {
        println!("  Deleted: {}", deleted.to_rfc3339());
    }
    println!("  Content hash: {}", issue.content_hash);
    if !issue.description.is_empty() {
        println!("\n{}", issue.description);
    }
}
