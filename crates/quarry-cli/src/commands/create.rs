use crate::support::{
    exit_with_error, import_mode, issue_json, mode_label, open_store_or_exit, print_json,
};
use quarry_bd::{Issue, IssueType, Status};
use serde_json::json;
use std::path::PathBuf;

pub struct Args {
    pub db: PathBuf,
    pub actor: String,
    pub title: String,
    pub id: Option<String>,
    pub status: String,
    pub issue_type: String,
    pub priority: i32,
    pub description: String,
    pub assignee: String,
    pub id_prefix: String,
    pub trusted: bool,
    pub json: bool,
}

pub fn run(args: Args) {
    let mut store = open_store_or_exit(&args.db);
    let mode = import_mode(args.trusted);

    let mut issue = Issue::new(args.id.unwrap_or_default(), args.title);
    issue.status = Status::from(args.status);
    issue.issue_type = IssueType::from(args.issue_type);
    issue.priority = args.priority;
    issue.description = args.description;
    issue.assignee = args.assignee;
    issue.created_by = args.actor.clone();
    issue.id_prefix = args.id_prefix;

    store
        .create_issue(&mut issue, &args.actor, mode)
        .unwrap_or_else(|e| exit_with_error(e));

    if args.json {
        print_json(&json!({
            "action": "create",
            "mode": mode_label(mode),
            "actor": args.actor,
            "issue": issue_json(&issue),
        }));
    } else {
        println!(
            "quarry create\n  Created: {} [{}]\n  Title: {}",
            issue.id, issue.status, issue.title
        );
    }
}
