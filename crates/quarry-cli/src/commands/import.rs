use crate::support::{exit_with_error, import_mode, mode_label, open_store_or_exit, print_json};
use quarry_bd::read_issues_from_path;
use serde_json::json;
use std::path::Path;

pub fn run(
    db: &Path,
    actor: &str,
    file: &Path,
    trusted: bool,
    id_prefix: Option<String>,
    json_output: bool,
) {
    let mut issues = read_issues_from_path(file).unwrap_or_else(|e| exit_with_error(e));
    if let Some(token) = id_prefix {
        for issue in &mut issues {
            issue.id_prefix = token.clone();
        }
    }

    let mut store = open_store_or_exit(db);
    let mode = import_mode(trusted);
    let ids = store
        .import_batch(issues, actor, mode)
        .unwrap_or_else(|e| exit_with_error(e));

    if json_output {
        print_json(&json!({
            "action": "import",
            "source": file.display().to_string(),
            "mode": mode_label(mode),
            "count": ids.len(),
            "ids": ids,
        }));
    } else {
        println!(
            "quarry import\n  Imported: {}\n  Source: {}\n  Mode: {}",
            ids.len(),
            file.display(),
            mode_label(mode)
        );
        for id in &ids {
            println!("  - {id}");
        }
    }
}
