//! CLI entry point for tasknest.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tasknest_app::{AppConfig, JsonFileStore, TaskService};
use tasknest_core::import::parse_instant;
use tasknest_core::{Category, CategoryFilter, Priority, SortKey, StatusFilter};
use time::OffsetDateTime;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Personal task list with categories, priorities and due dates.
#[derive(Parser, Debug)]
#[command(
    name = "tasknest",
    version,
    about = "tasknest: personal tasks with categories, priorities and due dates"
)]
struct Cli {
    /// Config file (defaults to <config dir>/tasknest/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data file, overriding the configured one.
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new task.
    Add {
        /// Task title.
        text: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(short = 'c', long)]
        category: Option<Category>,
        #[arg(short = 'p', long)]
        priority: Option<Priority>,
        /// Deadline as YYYY-MM-DD or RFC 3339.
        #[arg(long, value_parser = parse_due)]
        due: Option<OffsetDateTime>,
        /// Comma-separated tags.
        #[arg(short = 't', long)]
        tags: Option<String>,
    },

    /// Change fields of an existing task.
    Edit {
        /// Task id or unique id prefix.
        task: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(short = 'c', long)]
        category: Option<Category>,
        #[arg(short = 'p', long)]
        priority: Option<Priority>,
        #[arg(long, value_parser = parse_due, conflicts_with = "clear_due")]
        due: Option<OffsetDateTime>,
        #[arg(long)]
        clear_due: bool,
        /// Comma-separated tags; replaces the current list.
        #[arg(short = 't', long)]
        tags: Option<String>,
    },

    /// Toggle completion.
    Done {
        /// Task id or unique id prefix.
        task: String,
    },

    /// Toggle the archive flag.
    Archive {
        /// Task id or unique id prefix.
        task: String,
    },

    /// Delete a task permanently.
    Rm {
        /// Task id or unique id prefix.
        task: String,
    },

    /// Delete every completed task.
    ClearCompleted,

    /// List tasks.
    Ls {
        /// Case-insensitive text search over title, description and tags.
        #[arg(short = 's', long)]
        search: Option<String>,
        /// Category name or "all".
        #[arg(short = 'c', long)]
        category: Option<CategoryFilter>,
        /// all, active, completed, archived or overdue.
        #[arg(long)]
        status: Option<StatusFilter>,
        /// created, due, priority, category or alphabetical.
        #[arg(long)]
        sort: Option<SortKey>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show completion statistics.
    Stats {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print a single task as JSON.
    Show {
        /// Task id or unique id prefix.
        task: String,
    },

    /// Replace all tasks with the contents of a JSON file.
    Import {
        file: PathBuf,
    },

    /// Write all tasks as JSON.
    Export {
        /// Destination file (stdout when omitted).
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let Cli {
        config,
        data_file,
        cmd,
    } = Cli::parse();

    install_tracing();

    let mut config = AppConfig::load(config.as_deref())?;
    if let Some(path) = data_file {
        config = config.with_data_file(path);
    }
    let data_file = config.data_file()?;
    tracing::debug!(data_file = %data_file.display(), "opening task data");
    let mut service = TaskService::open(JsonFileStore::new(data_file))?;
    commands::run(cmd, &mut service, &config.defaults)
}

fn parse_due(raw: &str) -> Result<OffsetDateTime, String> {
    parse_instant(raw).ok_or_else(|| format!("expected YYYY-MM-DD or an RFC 3339 timestamp, got '{raw}'"))
}

fn install_tracing() {
    // RUST_LOG overrides; INFO otherwise. Logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
