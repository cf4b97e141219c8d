use crate::support::{exit_with_error, open_store_or_exit, print_json};
use serde_json::json;
use std::path::Path;

pub fn run(db: &Path, prefix: &str, json_output: bool) {
    let store = open_store_or_exit(db);
    store.init(prefix).unwrap_or_else(|e| exit_with_error(e));
    let prefix = prefix.trim();

    if json_output {
        print_json(&json!({
            "action": "init",
            "dbPath": db.display().to_string(),
            "issuePrefix": prefix,
        }));
    } else {
        println!(
            "quarry init\n  Prefix: {prefix}\n  Database: {}",
            db.display()
        );
    }
}
