use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "quarry",
    about = "Quarry: transactional issue creation and import over a SQLite store",
    version
)]
pub struct Cli {
    /// Path to the SQLite database
    #[arg(long, global = true, env = "QUARRY_DB", default_value = ".quarry/quarry.db")]
    pub db: PathBuf,

    /// Actor recorded on audit events
    #[arg(long, global = true, env = "QUARRY_ACTOR", default_value = "quarry")]
    pub actor: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database (if needed) and set the issue id prefix
    Init {
        /// Namespace prefix for issue ids (e.g. `PROJ`)
        #[arg(long)]
        prefix: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show (and optionally replace) the custom status and type vocabulary
    Vocab {
        /// Comma-separated custom statuses to store
        #[arg(long)]
        statuses: Option<String>,

        /// Comma-separated custom issue types to store
        #[arg(long)]
        types: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create one issue
    Create {
        /// Issue title
        #[arg(long)]
        title: String,

        /// Explicit issue ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Issue status
        #[arg(long, default_value = "open")]
        status: String,

        /// Issue type
        #[arg(long = "type", default_value = "task")]
        issue_type: String,

        /// Priority (0..4)
        #[arg(long, default_value_t = 2)]
        priority: i32,

        /// Issue description
        #[arg(long, default_value = "")]
        description: String,

        /// Assignee
        #[arg(long, default_value = "")]
        assignee: String,

        /// Sub-namespace token appended to the configured prefix
        #[arg(long, default_value = "")]
        id_prefix: String,

        /// Trust the supplied ID without checking its prefix
        #[arg(long)]
        trusted: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import issues from a JSONL file in one transaction
    Import {
        /// Path to issues JSONL
        file: PathBuf,

        /// Trust supplied IDs without checking their prefix
        #[arg(long)]
        trusted: bool,

        /// Sub-namespace token applied to every imported issue
        #[arg(long)]
        id_prefix: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one stored issue
    Show {
        /// Issue ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List issues marked dirty (pending export)
    Dirty {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List audit events for an issue
    Events {
        /// Issue ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
