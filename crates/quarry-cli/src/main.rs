//! Quarry CLI: the `quarry` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let db = cli.db;
    let actor = cli.actor;

    match cli.command {
        Commands::Init { prefix, json } => commands::init::run(&db, &prefix, json),

        Commands::Vocab {
            statuses,
            types,
            json,
        } => commands::vocab::run(&db, statuses, types, json),

        Commands::Create {
            title,
            id,
            status,
            issue_type,
            priority,
            description,
            assignee,
            id_prefix,
            trusted,
            json,
        } => commands::create::run(commands::create::Args {
            db,
            actor,
            title,
            id,
            status,
            issue_type,
            priority,
            description,
            assignee,
            id_prefix,
            trusted,
            json,
        }),

        Commands::Import {
            file,
            trusted,
            id_prefix,
            json,
        } => commands::import::run(&db, &actor, &file, trusted, id_prefix, json),

        Commands::Show { id, json } => commands::show::run(&db, &id, json),

        Commands::Dirty { json } => commands::dirty::run(&db, json),

        Commands::Events { id, json } => commands::events::run(&db, &id, json),
    }
}

/// Log to stderr, filtered by `QUARRY_LOG` (falls back to `warn` when unset
/// or invalid).
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("QUARRY_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
