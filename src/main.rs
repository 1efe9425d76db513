//! # Choreust
//!
//! A terminal tracker for recurring chores: change the furnace filter every
//! 90 days, pay the property tax at each quarter end, renew the car
//! registration every April 15th.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! choreust
//! # or explicitly
//! choreust ui
//! ```
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! # Interval task, first due on a given day
//! choreust add "Replace furnace filter" --frequency custom:90 --first-due 2025-01-15 --category Home
//!
//! # Interval task scheduled from the last time it was done
//! choreust add "Rotate tires" --frequency semiannually --last-done 2024-11-02 --category Vehicle
//!
//! # Calendar-anchored task
//! choreust add "Estimated taxes" --frequency quarterly --anchor quarter-end
//!
//! # Dashboard, mark done, undo
//! choreust list --status due-soon
//! choreust complete 3f2a --notes "used the MERV 11"
//! choreust undo 3f2a
//! ```
//!
//! Ids can be abbreviated to any unique prefix.
//!
//! ## Data Storage
//!
//! State is saved as JSON in your local data directory
//! (`~/.local/share/choreust/tasks.json` on Linux). Override with the
//! `CHOREUST_DB` environment variable. Set `RUST_LOG=choreust=debug` to see
//! what the engine is doing.

use std::io;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use choreust::commands::*;
use choreust::error::{exit_codes, Result};
use choreust::manager::TaskManager;
use choreust::models::{AnchorPattern, Frequency};
use choreust::status::Status;
use choreust::storage::JsonStore;
use choreust::tui::run_tui;

#[derive(Parser)]
#[command(name = "choreust")]
#[command(about = "Recurring maintenance task tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new recurring task
    Add {
        /// Task name (quoted if it has spaces)
        name: String,
        /// daily, weekly, biweekly, monthly, quarterly, semiannually, annually or custom:<days>
        #[arg(short, long, default_value = "monthly")]
        frequency: Frequency,
        /// Pin the schedule to the calendar: quarter-end, half-year-end,
        /// day-of-month:<day> or yearly-date:<MM-DD>
        #[arg(short, long)]
        anchor: Option<AnchorPattern>,
        /// First due date in YYYY-MM-DD (interval tasks; defaults to today)
        #[arg(long)]
        first_due: Option<NaiveDate>,
        /// Date the task was last done, recorded as a completion
        #[arg(short, long)]
        last_done: Option<NaiveDate>,
        /// Category id or name
        #[arg(short, long)]
        category: Option<String>,
        /// Longer description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List tasks, soonest due first
    List {
        /// Only show overdue, due-soon, upcoming or future tasks
        #[arg(short, long)]
        status: Option<Status>,
        /// Only show one category (id or name)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show a task and its completion history
    Show { id: String },
    /// Mark a task as done
    Complete {
        id: String,
        /// Completion date in YYYY-MM-DD (defaults to today, never in the future)
        #[arg(long)]
        on: Option<NaiveDate>,
        /// Notes to keep with the completion
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Undo a completion (the most recent one by default)
    Undo {
        id: String,
        /// Completion record id or prefix
        #[arg(short, long)]
        record: Option<String>,
    },
    /// Edit a task
    Edit {
        id: String,
        /// New task name
        #[arg(short, long)]
        name: Option<String>,
        /// New description (empty to clear)
        #[arg(short, long)]
        description: Option<String>,
        /// New frequency
        #[arg(short, long)]
        frequency: Option<Frequency>,
        /// Switch to a calendar anchor
        #[arg(short, long, conflicts_with = "interval")]
        anchor: Option<AnchorPattern>,
        /// Switch back to an interval schedule
        #[arg(long)]
        interval: bool,
        /// New first due date
        #[arg(long)]
        first_due: Option<NaiveDate>,
        /// New category id or name
        #[arg(short, long, conflicts_with = "no_category")]
        category: Option<String>,
        /// Remove the task from its category
        #[arg(long)]
        no_category: bool,
    },
    /// Remove a task and its history
    Remove { id: String },
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// Add a new category
    Add {
        /// Category name
        name: String,
        /// Hex color such as #8b5cf6
        #[arg(short, long, default_value = "#6b7280")]
        color: String,
    },
    /// List categories
    List,
    /// Remove a category (its tasks are kept)
    Remove {
        /// Category id or name
        id: String,
    },
}

fn init_tracing() {
    // Tracing is opt-in via RUST_LOG and goes to stderr.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(command: Option<Commands>) -> Result<()> {
    if let Some(Commands::Completions { shell }) = &command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "choreust", &mut io::stdout());
        return Ok(());
    }

    let mut mgr = TaskManager::load(JsonStore::open_default())?;
    if let Some(recovery) = mgr.store().recovery() {
        eprintln!(
            "Warning: data file could not be read ({}). It was moved to {} and a fresh one was started.",
            recovery.reason,
            recovery.backup.display()
        );
    }
    match command {
        Some(Commands::Add {
            name,
            frequency,
            anchor,
            first_due,
            last_done,
            category,
            description,
        }) => {
            let opts = AddOptions {
                description,
                anchor,
                first_due,
                last_done,
                category,
            };
            cmd_add(&mut mgr, name, frequency, opts).map(|_| ())
        }
        Some(Commands::List { status, category }) => cmd_list(&mgr, status, category),
        Some(Commands::Show { id }) => cmd_show(&mgr, &id),
        Some(Commands::Complete { id, on, notes }) => {
            cmd_complete(&mut mgr, &id, on, notes).map(|_| ())
        }
        Some(Commands::Undo { id, record }) => cmd_undo(&mut mgr, &id, record),
        Some(Commands::Edit {
            id,
            name,
            description,
            frequency,
            anchor,
            interval,
            first_due,
            category,
            no_category,
        }) => {
            let opts = EditOptions {
                name,
                description,
                frequency,
                anchor,
                interval,
                first_due,
                category,
                clear_category: no_category,
            };
            cmd_edit(&mut mgr, &id, opts)
        }
        Some(Commands::Remove { id }) => cmd_remove(&mut mgr, &id),
        Some(Commands::Category { command }) => match command {
            CategoryCommands::Add { name, color } => cmd_category_add(&mut mgr, &name, &color),
            CategoryCommands::List => {
                cmd_category_list(&mgr);
                Ok(())
            }
            CategoryCommands::Remove { id } => cmd_category_remove(&mut mgr, &id),
        },
        Some(Commands::Completions { .. }) => Ok(()),
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(mgr) {
                eprintln!("Error running TUI: {}", e);
                std::process::exit(exit_codes::OPERATION_FAILED);
            }
            Ok(())
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(cli.command) {
        eprintln!("Error: {}", err);
        if err.is_retryable() {
            eprintln!("Nothing was saved; it is safe to run the command again.");
        }
        std::process::exit(err.exit_code());
    }
}
