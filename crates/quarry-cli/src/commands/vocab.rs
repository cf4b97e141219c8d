use crate::support::{exit_with_error, open_store_or_exit, print_json};
use quarry_bd::{Vocabulary, parse_name_list};
use serde_json::json;
use std::path::Path;

pub fn run(db: &Path, statuses: Option<String>, types: Option<String>, json_output: bool) {
    let store = open_store_or_exit(db);

    if let Some(raw) = statuses.as_deref() {
        store
            .set_custom_statuses(&parse_name_list(raw))
            .unwrap_or_else(|e| exit_with_error(e));
    }
    if let Some(raw) = types.as_deref() {
        store
            .set_custom_types(&parse_name_list(raw))
            .unwrap_or_else(|e| exit_with_error(e));
    }

    let custom_statuses = store.custom_statuses().unwrap_or_else(|e| exit_with_error(e));
    let custom_types = store.custom_types().unwrap_or_else(|e| exit_with_error(e));
    let vocabulary = Vocabulary::new(custom_statuses.clone(), custom_types.clone());

    if json_output {
        print_json(&json!({
            "action": "vocab",
            "customStatuses": custom_statuses,
            "customTypes": custom_types,
            "statuses": vocabulary.status_names(),
            "types": vocabulary.type_names(),
        }));
    } else {
        println!(
            "quarry vocab\n  Statuses: {}\n  Types: {}",
            vocabulary.status_names().join(", "),
            vocabulary.type_names().join(", ")
        );
    }
}
