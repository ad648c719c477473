//! Clique CLI - operator interface over a clique state file
//!
//! Every invocation loads the state file, runs one engine operation against
//! it and writes it back when something changed. Operators use it to:
//! - Register events and their rosters
//! - Assemble, lock and swap groups by hand or through auto-formation
//! - Walk groups through warm-up, review and completion
//! - Record keep-in-touch picks and run the mutual-match pass
//! - Inspect progress and the audit trail

use clap::{Parser, Subcommand};
use clique_engine::CliqueEngine;
use clique_types::ActorId;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;
mod state;

use commands::{event, formation, group, inspect, matching, Session};
pub use config::CliConfig;
pub use error::{CliError, CliResult};
pub use output::OutputFormat;
pub use state::StateFile;

const DEFAULT_STATE_FILE: &str = "clique-state.json";
const DEFAULT_ACTOR: &str = "cli";

/// Clique CLI application
#[derive(Parser)]
#[command(name = "clique")]
#[command(about = "Clique - group formation and lifecycle CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CLIQUE_CONFIG", global = true)]
    config: Option<String>,

    /// State file path
    #[arg(short, long, env = "CLIQUE_STATE", global = true)]
    state: Option<PathBuf>,

    /// Actor recorded in the audit log
    #[arg(short, long, env = "CLIQUE_ACTOR", global = true)]
    actor: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Manage events and rosters
    Event {
        #[command(subcommand)]
        command: event::EventCommands,
    },

    /// Manage groups
    Group {
        #[command(subcommand)]
        command: group::GroupCommands,
    },

    /// List the groups of an event
    Groups {
        /// Event ID
        #[arg(long)]
        event: String,
    },

    /// List the active members of a group
    Members {
        /// Group ID
        #[arg(long)]
        group: String,
    },

    /// Show warm-up progress of a group
    Progress {
        /// Group ID
        #[arg(long)]
        group: String,
    },

    /// Form groups from the unassigned pool
    AutoForm {
        /// Event ID
        #[arg(long)]
        event: String,

        /// Target group size
        #[arg(long)]
        size: usize,
    },

    /// Record keep-in-touch picks after a completed group
    Keep {
        /// Origin group ID
        #[arg(long)]
        group: String,

        /// Requesting participant
        #[arg(long)]
        participant: String,

        /// Member to keep in touch with (repeatable)
        #[arg(long = "pick")]
        picks: Vec<String>,

        /// Record that the participant does not want to keep in touch
        #[arg(long)]
        opt_out: bool,
    },

    /// Resolve pending keep-in-touch requests into persistent groups
    ResolveMatches,

    /// List persistent groups
    Crews,

    /// Show the newest audit records
    Audit {
        /// Number of records (0 for all)
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Show configuration
    Config,
}

/// Run using the current process arguments.
pub async fn run() -> CliResult<()> {
    run_with_args(std::env::args_os()).await
}

/// Run using the provided argument iterator.
pub async fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Logs go to stderr so JSON output stays parseable
    let filter = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    let config = CliConfig::load(cli.config.as_deref())?;
    let state_path = cli
        .state
        .or_else(|| config.state_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));
    let actor = cli
        .actor
        .or_else(|| config.default_actor.clone())
        .unwrap_or_else(|| DEFAULT_ACTOR.to_string());
    if actor.trim().is_empty() {
        return Err(CliError::InvalidInput("actor must not be blank".into()));
    }

    if let Commands::Config = cli.command {
        println!("State file: {}", state_path.display());
        println!("Actor: {}", actor);
        println!("Config: {:?}", config);
        return Ok(());
    }

    let state = StateFile::new(state_path);
    let storage = state.load()?;
    debug!(path = %state.path().display(), "State loaded");
    let engine = CliqueEngine::builder()
        .with_storage(storage.clone())
        .with_config(config.engine.clone())
        .build()?;
    let session = Session::new(engine, storage, state, ActorId::new(actor), cli.output);

    match cli.command {
        Commands::Event { command } => event::execute(command, &session).await,
        Commands::Group { command } => group::execute(command, &session).await,
        Commands::Groups { event } => inspect::groups(event, &session).await,
        Commands::Members { group } => inspect::members(group, &session).await,
        Commands::Progress { group } => inspect::progress(group, &session).await,
        Commands::AutoForm { event, size } => formation::auto_form(event, size, &session).await,
        Commands::Keep {
            group,
            participant,
            picks,
            opt_out,
        } => matching::keep(group, participant, picks, opt_out, &session).await,
        Commands::ResolveMatches => matching::resolve(&session).await,
        Commands::Crews => matching::crews(&session).await,
        Commands::Audit { limit } => inspect::audit(limit, &session).await,
        Commands::Config => Ok(()),
    }
}
