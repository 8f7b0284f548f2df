//! Command-line interface for slate
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is implemented in its own submodule. The CLI is a thin
//! shell: it parses input, calls one store operation through the configured
//! backend, and formats output; every invariant lives in the library.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::TaskRecord;
use crate::output::OutputOptions;
use crate::persist::{self, Backend};

mod epic;
mod sub;
mod task;
mod view;

/// slate - schedule-aware task tracker
///
/// Tracks standalone tasks, epics, and subtasks with automatic epic
/// rollups, time-slot conflict detection, and a recently-viewed history.
#[derive(Parser, Debug)]
#[command(name = "slate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Workspace directory (defaults to the current directory)
    #[arg(long, global = true, env = "SLATE_DIR")]
    pub dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Standalone tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Epics (containers of subtasks; status and schedule are derived)
    #[command(subcommand)]
    Epic(EpicCommands),

    /// Subtasks (each belongs to exactly one epic)
    #[command(subcommand)]
    Sub(SubCommands),

    /// Scheduled tasks and subtasks, earliest start first
    Agenda,

    /// Recently viewed items, oldest first
    History {
        /// Forget the recently-viewed list
        #[arg(long)]
        clear: bool,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task
    New {
        /// Task name (unique across tasks, epics, and subtasks)
        name: String,

        /// Free-form description
        #[arg(long, default_value = "")]
        desc: String,

        /// Status: new, in_progress, done
        #[arg(long, default_value = "new")]
        status: String,

        /// Start time (RFC 3339 or YYYY-MM-DDTHH:MM, UTC)
        #[arg(long)]
        at: Option<String>,

        /// Duration in minutes
        #[arg(long = "for")]
        minutes: Option<i64>,
    },

    /// List all tasks
    Ls,

    /// Show one task (records a view in the history)
    Show {
        id: u64,
    },

    /// Update fields of an existing task
    Update {
        id: u64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        desc: Option<String>,

        /// Status: new, in_progress, done
        #[arg(long)]
        status: Option<String>,

        /// Start time (RFC 3339 or YYYY-MM-DDTHH:MM, UTC)
        #[arg(long)]
        at: Option<String>,

        /// Remove the start time
        #[arg(long, conflicts_with = "at")]
        clear_at: bool,

        /// Duration in minutes
        #[arg(long = "for")]
        minutes: Option<i64>,

        /// Remove the duration
        #[arg(long, conflicts_with = "minutes")]
        clear_duration: bool,
    },

    /// Delete a task
    Rm {
        id: u64,
    },

    /// Delete all tasks
    Clear,
}

/// Epic subcommands
#[derive(Subcommand, Debug)]
pub enum EpicCommands {
    /// Create an epic
    New {
        /// Epic name (unique across tasks, epics, and subtasks)
        name: String,

        /// Free-form description
        #[arg(long, default_value = "")]
        desc: String,
    },

    /// List all epics
    Ls,

    /// Show one epic and its subtasks (records a view in the history)
    Show {
        id: u64,
    },

    /// Rename an epic or change its description
    Update {
        id: u64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        desc: Option<String>,
    },

    /// Delete an epic and all of its subtasks
    Rm {
        id: u64,
    },

    /// Delete all epics (subtasks go with them)
    Clear,
}

/// Subtask subcommands
#[derive(Subcommand, Debug)]
pub enum SubCommands {
    /// Create a subtask under an existing epic
    New {
        /// Parent epic id
        #[arg(long, required = true)]
        epic: u64,

        /// Subtask name (unique across tasks, epics, and subtasks)
        name: String,

        /// Free-form description
        #[arg(long, default_value = "")]
        desc: String,

        /// Status: new, in_progress, done
        #[arg(long, default_value = "new")]
        status: String,

        /// Start time (RFC 3339 or YYYY-MM-DDTHH:MM, UTC)
        #[arg(long)]
        at: Option<String>,

        /// Duration in minutes
        #[arg(long = "for")]
        minutes: Option<i64>,
    },

    /// List subtasks, optionally of one epic
    Ls {
        /// Restrict to members of this epic
        #[arg(long)]
        epic: Option<u64>,
    },

    /// Show one subtask (records a view in the history)
    Show {
        id: u64,
    },

    /// Update fields of an existing subtask
    Update {
        id: u64,

        /// Move to another epic
        #[arg(long)]
        epic: Option<u64>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        desc: Option<String>,

        /// Status: new, in_progress, done
        #[arg(long)]
        status: Option<String>,

        /// Start time (RFC 3339 or YYYY-MM-DDTHH:MM, UTC)
        #[arg(long)]
        at: Option<String>,

        /// Remove the start time
        #[arg(long, conflicts_with = "at")]
        clear_at: bool,

        /// Duration in minutes
        #[arg(long = "for")]
        minutes: Option<i64>,

        /// Remove the duration
        #[arg(long, conflicts_with = "minutes")]
        clear_duration: bool,
    },

    /// Delete a subtask
    Rm {
        id: u64,
    },

    /// Delete all subtasks (epics remain and reset to new)
    Clear,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let dir = self.dir;

        match self.command {
            Commands::Task(command) => task::run(command, dir, output),
            Commands::Epic(command) => epic::run(command, dir, output),
            Commands::Sub(command) => sub::run(command, dir, output),
            Commands::Agenda => view::run_agenda(dir, output),
            Commands::History { clear } => view::run_history(dir, output, clear),
        }
    }
}

// =============================================================================
// Shared command plumbing
// =============================================================================

/// The backend selected by the workspace's config
pub(crate) struct Workspace {
    pub backend: Box<dyn Backend>,
}

pub(crate) fn open(dir: Option<&Path>) -> Result<Workspace> {
    let root = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let config = Config::load(&root)?;
    let backend = persist::backend_for(&root, &config);
    Ok(Workspace { backend })
}

/// Parse a start time: RFC 3339, or a naive `YYYY-MM-DDTHH:MM` taken as UTC
pub(crate) fn parse_start(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(t.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(Error::InvalidArgument(format!(
        "Invalid start time '{raw}'. Expected RFC 3339 or YYYY-MM-DDTHH:MM"
    )))
}

/// One-line human rendering of a record
pub(crate) fn format_record(record: &TaskRecord) -> String {
    let schedule = match (record.start_time, record.duration_min) {
        (Some(start), Some(minutes)) => {
            format!("  @ {} +{}m", start.format("%Y-%m-%d %H:%M"), minutes)
        }
        (Some(start), None) => format!("  @ {}", start.format("%Y-%m-%d %H:%M")),
        _ => String::new(),
    };
    format!(
        "{:>4}  {:<12} {}{}",
        record.id,
        record.status.as_str(),
        record.name,
        schedule
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_start_accepts_rfc3339_and_naive_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        assert_eq!(parse_start("2024-05-01T09:00:00Z").unwrap(), expected);
        assert_eq!(parse_start("2024-05-01T09:00").unwrap(), expected);
        assert_eq!(parse_start("2024-05-01 09:00").unwrap(), expected);
        assert!(parse_start("next tuesday").is_err());
    }
}
