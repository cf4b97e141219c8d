use crate::support::{exit_with_error, open_store_or_exit, print_json};
use serde_json::json;
use std::path::Path;

pub fn run(db: &Path, json_output: bool) {
    let store = open_store_or_exit(db);
    let ids = store
        .dirty_issue_ids()
        .unwrap_or_else(|e| exit_with_error(e));

    if json_output {
        print_json(&json!({
            "action": "dirty",
            "count": ids.len(),
            "ids": ids,
        }));
    } else {
        println!("quarry dirty\n  Pending export: {}", ids.len());
        for id in &ids {
            println!("  - {id}");
        }
    }
}
