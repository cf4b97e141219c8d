use crate::support::{exit_with_error, open_store_or_exit, print_json};
use serde_json::json;
use std::path::Path;

pub fn run(db: &Path, id: &str, json_output: bool) {
    let store = open_store_or_exit(db);
    let events = store
        .events_for(id)
        .unwrap_or_else(|e| exit_with_error(e));

    if json_output {
        let items = events
            .iter()
            .map(|event| {
                json!({
                    "eventId": event.event_id,
                    "kind": event.kind(),
                    "actor": event.actor,
                    "comment": event.comment,
                    "occurredAt": event.occurred_at.to_rfc3339(),
                })
            })
            .collect::<Vec<_>>();
        print_json(&json!({
            "action": "events",
            "issueId": id,
            "count": items.len(),
            "events": items,
        }));
    } else {
        println!("quarry events {id}\n  Events: {}", events.len());
        for event in &events {
            println!(
                "  - {} {} by {}: {}",
                event.occurred_at.to_rfc3339(),
                event.kind(),
                event.actor,
                event.comment.as_deref().unwrap_or("")
            );
        }
    }
}
