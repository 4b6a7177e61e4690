//! # taskboard - project and task board
//!
//! A command-line task board with a terminal user interface (TUI). Tasks
//! belong to projects; the task list can be searched, filtered by project or
//! status category, sorted, and acted on in bulk.
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a project and a task in it
//! tb projects add "Website" --status active
//! tb add "Write landing copy" --project 1 --due friday --priority high
//!
//! # Filtered, sorted list
//! tb list --category due-today --sort priority --desc
//!
//! # Mark every active task in project 1 complete
//! tb bulk complete --project 1 --category active
//!
//! # Launch the TUI
//! tb ui
//! ```
//!
//! Data lives in `~/.taskboard/` (or `$TASKBOARD_DIR`) as `taskboard.json`,
//! with optional view defaults in `config.toml`. Logging is controlled with
//! `TASKBOARD_LOG` (an `EnvFilter` directive) and `TASKBOARD_LOG_FORMAT`
//! (`compact` or `json`); the TUI writes its log to `taskboard.log` in the
//! data directory.

use std::env;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub mod bulk;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod fields;
pub mod notice;
pub mod page;
pub mod project;
pub mod record;
pub mod selection;
pub mod service;
pub mod task;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::{data_dir, db_path, load_config, LOG_FILE};
use db::Database;

/// Set up tracing. `log_file` redirects output away from the terminal (used by the TUI).
fn init_tracing(log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_env("TASKBOARD_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "tb=debug,info"
        } else {
            "tb=info,warn"
        })
    });

    let format = env::var("TASKBOARD_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let writer = match log_file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
            Err(_) => BoxMakeWriter::new(std::io::sink),
        },
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let ansi = log_file.is_none();

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false).with_writer(writer)).init();
        }
        _ => {
            registry.with(fmt::layer().compact().with_ansi(ansi).with_writer(writer)).init();
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let data_dir = data_dir(cli.db.as_deref());

    let log_file = matches!(cli.command, Commands::Ui).then(|| data_dir.join(LOG_FILE));
    if log_file.is_some() {
        // The log file lives in the data dir, which may not exist on first run.
        let _ = std::fs::create_dir_all(&data_dir);
    }
    init_tracing(log_file.as_deref());

    if let Err(e) = run(cli, &data_dir) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, data_dir: &Path) -> Result<()> {
    // Completions need neither config nor store.
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let config = load_config(data_dir)?;
    let defaults = config.view;
    let db_path = db_path(cli.db.as_deref(), data_dir);
    debug!(path = %db_path.display(), "opening store");
    let mut db = Database::open(&db_path)?;

    match cli.command {
        Commands::Ui => cmd_ui(db, &defaults),
        Commands::List { view, limit } => cmd_list(&db, &defaults, &view, limit),
        Commands::View { id } => cmd_view(&db, id),
        Commands::Add { title, project, desc, due, priority } => {
            cmd_add(&mut db, &defaults, title, project, desc, due, priority)
        }
        Commands::Update { id, title, desc, project, due, clear_due, priority } => {
            cmd_update(&mut db, &defaults, id, title, desc, project, due, clear_due, priority)
        }
        Commands::Toggle { id } => cmd_toggle(&mut db, &defaults, id),
        Commands::Delete { id, yes } => cmd_delete(&mut db, &defaults, id, yes),
        Commands::Bulk { action, ids, priority, to_project, yes, view } => {
            cmd_bulk(&mut db, &defaults, action, ids, priority, to_project, yes, &view)
        }
        Commands::Projects { action } => cmd_projects(&mut db, action),
        Commands::Dashboard => cmd_dashboard(&db, &defaults),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}
