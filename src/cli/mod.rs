//! CLI command definitions for crew-dispatch
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod export;
pub mod import;

use crate::format::OutputFormat;
use crate::query::{SortKey, StatusFilter, TaskFilter, TaskView};
use crate::types::Priority;
use clap::{Args, Parser, Subcommand, ValueEnum};
use export::ExportArgs;
use import::ImportArgs;

/// Output format flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Markdown,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Task priority flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    High,
    Medium,
    Low,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::High => Priority::High,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::Low => Priority::Low,
        }
    }
}

/// Task status filter flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusArg {
    #[default]
    All,
    Active,
    Completed,
    Assigned,
    Unassigned,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => StatusFilter::All,
            StatusArg::Active => StatusFilter::Active,
            StatusArg::Completed => StatusFilter::Completed,
            StatusArg::Assigned => StatusFilter::Assigned,
            StatusArg::Unassigned => StatusFilter::Unassigned,
        }
    }
}

/// Task list ordering flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortArg {
    /// Keep insertion order
    #[default]
    None,
    /// High, then medium, then low (stable)
    Priority,
    /// Earliest deadline first
    Deadline,
    /// Newest first
    Created,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::None => SortKey::None,
            SortArg::Priority => SortKey::Priority,
            SortArg::Deadline => SortKey::Deadline,
            SortArg::Created => SortKey::Created,
        }
    }
}

/// Cleaning crew assignment engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Output format (overrides config)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<FormatArg>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load (or seed) the roster and report its size
    Init,

    /// Manage workers
    #[command(subcommand)]
    Worker(WorkerCommand),

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Show dashboard counts
    Stats,

    /// Export the roster as CSV or a snapshot file
    Export(ExportArgs),

    /// Replace the roster from a snapshot file
    Import(ImportArgs),
}

#[derive(Subcommand, Debug)]
pub enum WorkerCommand {
    /// Add a worker (available, no hours assigned)
    Add {
        /// Display name
        name: String,
    },

    /// List workers
    List {
        /// Only workers open to new assignments
        #[arg(long)]
        available: bool,
    },

    /// Open or close a worker to new assignments
    Availability {
        /// Worker id, e.g. W001
        worker_id: String,

        #[arg(action = clap::ArgAction::Set)]
        available: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a task, optionally assigning it right away
    Add {
        description: String,

        #[arg(short, long, value_enum, default_value = "medium")]
        priority: PriorityArg,

        /// Estimated hours (positive)
        #[arg(long)]
        hours: f64,

        /// Deadline as YYYY-MM-DD
        #[arg(long)]
        deadline: String,

        /// Worker to assign the new task to
        #[arg(long, value_name = "WORKER")]
        assign: Option<String>,
    },

    /// List tasks
    List(TaskListArgs),

    /// Assign an unassigned task to a worker
    Assign { task_id: String, worker_id: String },

    /// Return an assigned task to the pool
    Unassign { task_id: String },

    /// Mark an assigned task completed
    Complete { task_id: String },
}

/// Arguments for `task list`
#[derive(Args, Debug, Default)]
pub struct TaskListArgs {
    /// Case-insensitive match on id, description or assignee
    #[arg(short, long)]
    pub search: Option<String>,

    #[arg(long, value_enum, default_value = "all")]
    pub status: StatusArg,

    #[arg(short, long, value_enum)]
    pub priority: Option<PriorityArg>,

    #[arg(long, value_enum, default_value = "none")]
    pub sort: SortArg,
}

impl TaskListArgs {
    pub fn to_view(&self) -> TaskView {
        TaskView {
            query: self.search.clone(),
            filter: TaskFilter {
                status: self.status.into(),
                priority: self.priority.map(Priority::from),
            },
            sort: self.sort.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_task_add_with_assign() {
        let cli = Cli::parse_from([
            "crew-dispatch",
            "task",
            "add",
            "Clean lobby",
            "--priority",
            "high",
            "--hours",
            "5",
            "--deadline",
            "2025-01-01",
            "--assign",
            "W001",
        ]);
        match cli.command {
            Command::Task(TaskCommand::Add {
                description,
                priority,
                hours,
                deadline,
                assign,
            }) => {
                assert_eq!(description, "Clean lobby");
                assert_eq!(priority, PriorityArg::High);
                assert_eq!(hours, 5.0);
                assert_eq!(deadline, "2025-01-01");
                assert_eq!(assign.as_deref(), Some("W001"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_availability_bool() {
        let cli = Cli::parse_from(["crew-dispatch", "worker", "availability", "W002", "false"]);
        match cli.command {
            Command::Worker(WorkerCommand::Availability {
                worker_id,
                available,
            }) => {
                assert_eq!(worker_id, "W002");
                assert!(!available);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn task_list_flags_build_view() {
        let cli = Cli::parse_from([
            "crew-dispatch",
            "--format",
            "json",
            "task",
            "list",
            "--status",
            "active",
            "--priority",
            "low",
            "--sort",
            "deadline",
            "--search",
            "lobby",
        ]);
        assert_eq!(cli.format, Some(FormatArg::Json));
        let Command::Task(TaskCommand::List(args)) = cli.command else {
            panic!("expected task list");
        };
        let view = args.to_view();
        assert_eq!(view.query.as_deref(), Some("lobby"));
        assert_eq!(view.filter.status, StatusFilter::Active);
        assert_eq!(view.filter.priority, Some(Priority::Low));
        assert_eq!(view.sort, SortKey::Deadline);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["crew-dispatch", "stats", "--log", "off", "-v"]);
        assert!(matches!(cli.command, Command::Stats));
        assert_eq!(cli.log, "off");
        assert!(cli.verbose);
    }
}
