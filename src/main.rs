//! crew-dispatch
//!
//! Command-line front end for the cleaning crew assignment engine. Each
//! invocation opens the roster database, runs one command and exits.

use anyhow::Result;
use clap::Parser;
use crew_dispatch::cli::export::{ExportArgs, ExportKind};
use crew_dispatch::cli::import::ImportArgs;
use crew_dispatch::cli::{Cli, Command, TaskCommand, TaskListArgs, WorkerCommand};
use crew_dispatch::config::{Config, ConfigLoader, ENV_CONFIG_PATH};
use crew_dispatch::error::EngineError;
use crew_dispatch::export::Snapshot;
use crew_dispatch::format::{
    OutputFormat, format_stats_markdown, format_task_markdown, format_tasks_markdown,
    format_worker_markdown, format_workers_markdown,
};
use crew_dispatch::persist::{SqliteKv, check_integrity, reconcile};
use crew_dispatch::query::{apply_view, due_within};
use crew_dispatch::store::EntityStore;
use crew_dispatch::types::{Assignment, Priority};
use serde::Serialize;
use serde_json::json;
use std::fs::OpenOptions;
use std::io::Write;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Exit status for an operation the engine rejected.
const EXIT_REJECTED: u8 = 2;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on --log option; RUST_LOG takes precedence
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    // If explicit config path given, set it as env var for ConfigLoader to pick up
    // SAFETY: This is safe at program startup before any other threads are spawned
    if let Some(config_path) = &cli.config {
        unsafe {
            std::env::set_var(ENV_CONFIG_PATH, config_path);
        }
    }
    let mut loader = ConfigLoader::load()?;
    if let Some(path) = loader.config_path() {
        debug!(path = %path.display(), "Using config file");
    }

    let config = loader.config_mut();
    if let Some(db_path) = &cli.database {
        config.server.db_path = db_path.into();
    }
    if let Some(format) = cli.format {
        config.server.default_format = format.into();
    }
    let config = loader.into_config();

    match run(&config, cli.command) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast::<EngineError>() {
            Ok(rejected) if rejected.is_rejection() => {
                report_rejection(config.server.default_format, &rejected)?;
                Ok(ExitCode::from(EXIT_REJECTED))
            }
            Ok(failed) => Err(failed.into()),
            Err(other) => Err(other),
        },
    }
}

fn open_store(config: &Config) -> Result<EntityStore> {
    let kv = SqliteKv::open(&config.server.db_path)?;
    let store = EntityStore::open(Box::new(kv), config.server.seed_defaults)?;
    debug!(db = %config.server.db_path.display(), ?store, "Opened roster");
    Ok(store)
}

fn run(config: &Config, command: Command) -> Result<()> {
    let format = config.server.default_format;

    match command {
        Command::Init => run_init(config, &mut open_store(config)?, format),
        Command::Worker(cmd) => run_worker(&mut open_store(config)?, cmd, format),
        Command::Task(cmd) => run_task(&mut open_store(config)?, cmd, format),
        Command::Stats => run_stats(config, &open_store(config)?, format),
        Command::Export(args) => run_export(&open_store(config)?, args),
        Command::Import(args) => run_import(config, args, format),
    }
}

/// Print `value` as JSON, or the markdown rendering otherwise.
fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    markdown: impl FnOnce() -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Markdown => print!("{}", markdown()),
    }
    Ok(())
}

fn emit_assignment(format: OutputFormat, assignment: &Assignment) -> Result<()> {
    emit(format, assignment, || {
        let mut md = format_task_markdown(&assignment.task);
        if let Some(ref worker) = assignment.worker {
            md.push('\n');
            md.push_str(&format_worker_markdown(worker));
        }
        md
    })
}

fn report_rejection(format: OutputFormat, err: &EngineError) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&err.to_body())?),
        OutputFormat::Markdown => eprintln!("Error: {}", err),
    }
    Ok(())
}

fn run_init(config: &Config, store: &mut EntityStore, format: OutputFormat) -> Result<()> {
    store.initialize_data(config.server.seed_defaults)?;
    let stats = store.stats();
    let body = json!({
        "database": config.server.db_path,
        "workers": stats.total_workers,
        "tasks": stats.total_tasks,
    });
    emit(format, &body, || {
        format!(
            "Roster ready at {}: {} workers, {} tasks\n",
            config.server.db_path.display(),
            stats.total_workers,
            stats.total_tasks
        )
    })
}

fn run_worker(store: &mut EntityStore, cmd: WorkerCommand, format: OutputFormat) -> Result<()> {
    match cmd {
        WorkerCommand::Add { name } => {
            let worker = store.add_worker(&name)?;
            emit(format, &worker, || format_worker_markdown(&worker))
        }
        WorkerCommand::List { available } => {
            let workers = if available {
                store.get_available_workers()
            } else {
                store.get_workers()
            };
            emit(format, &workers, || format_workers_markdown(&workers))
        }
        WorkerCommand::Availability {
            worker_id,
            available,
        } => {
            let worker = store.update_worker_availability(&worker_id, available)?;
            emit(format, &worker, || format_worker_markdown(&worker))
        }
    }
}

fn run_task(store: &mut EntityStore, cmd: TaskCommand, format: OutputFormat) -> Result<()> {
    match cmd {
        TaskCommand::Add {
            description,
            priority,
            hours,
            deadline,
            assign,
        } => {
            let priority = Priority::from(priority);
            let Some(worker_id) = assign else {
                let task = store.add_task(&description, priority, hours, &deadline)?;
                return emit(format, &task, || format_task_markdown(&task));
            };

            let intake =
                store.add_task_and_assign(&description, priority, hours, &deadline, &worker_id)?;
            emit_assignment(
                format,
                &Assignment {
                    task: intake.task,
                    worker: intake.worker,
                },
            )?;
            // The task stays created; only the assignment is reported as rejected.
            match intake.assign_error {
                Some(e) => Err(e.into()),
                None => Ok(()),
            }
        }
        TaskCommand::List(args) => run_task_list(store, &args, format),
        TaskCommand::Assign { task_id, worker_id } => {
            let assignment = store.assign_task_to_worker(&task_id, &worker_id)?;
            emit_assignment(format, &assignment)
        }
        TaskCommand::Unassign { task_id } => {
            let assignment = store.unassign_task(&task_id)?;
            emit_assignment(format, &assignment)
        }
        TaskCommand::Complete { task_id } => {
            let assignment = store.complete_task(&task_id)?;
            emit_assignment(format, &assignment)
        }
    }
}

fn run_task_list(store: &EntityStore, args: &TaskListArgs, format: OutputFormat) -> Result<()> {
    let tasks = apply_view(&store.get_tasks(), &args.to_view());
    emit(format, &tasks, || format_tasks_markdown(&tasks))
}

fn run_stats(config: &Config, store: &EntityStore, format: OutputFormat) -> Result<()> {
    let stats = store.stats();
    let hours = config.schedule.due_soon_hours;
    let active: Vec<_> = store
        .get_tasks()
        .into_iter()
        .filter(|t| !t.completed)
        .collect();
    let due_soon = due_within(&active, chrono::Utc::now(), hours).len();

    let body = json!({
        "stats": stats,
        "dueSoon": due_soon,
        "dueSoonHours": hours,
    });
    emit(format, &body, || format_stats_markdown(&stats, due_soon, hours))
}

/// Run the export command
fn run_export(store: &EntityStore, args: ExportArgs) -> Result<()> {
    match args.kind {
        ExportKind::Csv => {
            let csv = store.export_to_csv();
            if let Some(ref path) = args.output {
                std::fs::write(path, &csv)?;
                eprintln!("Exported {} tasks to {}", store.get_tasks().len(), path.display());
            } else {
                println!("{}", csv);
            }
        }
        ExportKind::Snapshot => {
            let snapshot = Snapshot::new(store.snapshot());
            let should_compress = args.should_compress();

            if let Some(ref path) = args.output {
                snapshot.write_to_file(path, should_compress)?;
                if should_compress {
                    eprintln!("Exported to {} (gzipped)", path.display());
                } else {
                    eprintln!("Exported to {}", path.display());
                }
            } else if should_compress {
                use flate2::Compression;
                use flate2::write::GzEncoder;

                let json_output = snapshot.to_json_pretty()?;
                let stdout = std::io::stdout();
                let mut encoder = GzEncoder::new(stdout.lock(), Compression::default());
                encoder.write_all(json_output.as_bytes())?;
                encoder.finish()?.flush()?;
            } else {
                println!("{}", snapshot.to_json_pretty()?);
            }
        }
    }

    Ok(())
}

/// Run the import command
fn run_import(config: &Config, args: ImportArgs, format: OutputFormat) -> Result<()> {
    let snapshot = Snapshot::from_file(&args.file)?;
    debug!(
        file = %args.file.display(),
        exported_by = %snapshot.exported_by,
        exported_at = %snapshot.exported_at,
        "Loaded snapshot"
    );

    if args.dry_run {
        let mut data = snapshot.data;
        let valid = check_integrity(&data);
        let repairs = if valid.is_ok() {
            reconcile(&mut data)
        } else {
            Vec::new()
        };
        let failure = valid.err().map(|e| format!("{:#}", e));
        let body = json!({
            "dryRun": true,
            "wouldSucceed": failure.is_none(),
            "failureReason": failure,
            "workers": data.workers.len(),
            "tasks": data.tasks.len(),
            "repairs": repairs,
        });
        return emit(format, &body, || {
            let mut md = String::from("Dry run results:\n");
            md.push_str(&format!("  Would succeed: {}\n", failure.is_none()));
            if let Some(ref reason) = failure {
                md.push_str(&format!("  Failure reason: {}\n", reason));
            }
            md.push_str(&format!("  Workers: {}\n", data.workers.len()));
            md.push_str(&format!("  Tasks: {}\n", data.tasks.len()));
            if !repairs.is_empty() {
                md.push_str("  Repairs:\n");
                for note in &repairs {
                    md.push_str(&format!("    - {}\n", note));
                }
            }
            md
        });
    }

    // The roster is replaced wholesale, so the stored one is never read.
    let kv = SqliteKv::open(&config.server.db_path)?;
    let mut store = EntityStore::open_empty(Box::new(kv));
    let workers = snapshot.data.workers.len();
    let tasks = snapshot.data.tasks.len();
    let repairs = store.replace_data(snapshot.data)?;
    let body = json!({
        "dryRun": false,
        "workers": workers,
        "tasks": tasks,
        "repairs": repairs,
    });
    emit(format, &body, || {
        let mut md = String::from("Import complete:\n");
        md.push_str(&format!("  Workers: {}\n", workers));
        md.push_str(&format!("  Tasks: {}\n", tasks));
        for note in &repairs {
            md.push_str(&format!("  Repaired: {}\n", note));
        }
        md
    })
}
