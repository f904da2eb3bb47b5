//! Persistence boundary for the roster.
//!
//! The whole [`WorkerManagementData`] snapshot is stored as JSON under a
//! single key of a [`KeyValueStore`]. Loading validates the snapshot and
//! repairs derived fields; an empty backend is seeded once.

mod memory;
mod seed;
mod sqlite;

pub use memory::MemoryKv;
pub use seed::default_roster;
pub use sqlite::SqliteKv;

use crate::ids::{IdKind, MAX_ID_VALUE, parse_id};
use crate::types::{CAPACITY_EPSILON, DAILY_CAPACITY_HOURS, WorkerManagementData};
use anyhow::{Context, Result, anyhow, bail};
use std::collections::HashSet;
use tracing::{info, warn};

/// Key the roster snapshot is stored under.
pub const DATA_KEY: &str = "worker_management_data";

/// String key-value storage the store writes through to.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Get the current timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Load the stored snapshot, or seed and save one if none exists.
///
/// Safe to call repeatedly: an existing snapshot is returned as stored
/// (after repairs), never replaced.
pub fn initialize_data(
    kv: &mut dyn KeyValueStore,
    seed_defaults: bool,
) -> Result<WorkerManagementData> {
    if let Some(data) = load_snapshot(kv)? {
        return Ok(data);
    }

    let data = if seed_defaults {
        default_roster(chrono::Utc::now())
    } else {
        WorkerManagementData::default()
    };
    save_snapshot(kv, &data)?;
    info!(
        workers = data.workers.len(),
        tasks = data.tasks.len(),
        seeded = seed_defaults,
        "Initialized new roster"
    );
    Ok(data)
}

/// Read and validate the stored snapshot, if present.
pub fn load_snapshot(kv: &dyn KeyValueStore) -> Result<Option<WorkerManagementData>> {
    let Some(raw) = kv.get(DATA_KEY)? else {
        return Ok(None);
    };
    let mut data: WorkerManagementData =
        serde_json::from_str(&raw).context("stored roster snapshot is not valid JSON")?;
    check_integrity(&data)?;
    for note in reconcile(&mut data) {
        warn!(repair = %note, "Repaired stored roster snapshot");
    }
    Ok(Some(data))
}

/// Write the snapshot through to the backend.
pub fn save_snapshot(kv: &mut dyn KeyValueStore, data: &WorkerManagementData) -> Result<()> {
    let json = serde_json::to_string(data)?;
    kv.set(DATA_KEY, &json)
}

/// Reject snapshots that break invariants which cannot be repaired.
///
/// Checks id format and uniqueness, non-blank names and descriptions,
/// positive estimates, and that every assignment points at a real worker.
pub fn check_integrity(data: &WorkerManagementData) -> Result<()> {
    let mut worker_ids = HashSet::new();
    for worker in &data.workers {
        match parse_id(IdKind::Worker, &worker.id) {
            None => bail!("malformed worker id '{}'", worker.id),
            Some(n) if n > MAX_ID_VALUE => bail!("worker id '{}' is out of range", worker.id),
            Some(_) => {}
        }
        if !worker_ids.insert(worker.id.as_str()) {
            bail!("duplicate worker id '{}'", worker.id);
        }
        if worker.name.trim().is_empty() {
            bail!("worker {} has an empty name", worker.id);
        }
    }

    let mut task_ids = HashSet::new();
    for task in &data.tasks {
        match parse_id(IdKind::Task, &task.id) {
            None => bail!("malformed task id '{}'", task.id),
            Some(n) if n > MAX_ID_VALUE => bail!("task id '{}' is out of range", task.id),
            Some(_) => {}
        }
        if !task_ids.insert(task.id.as_str()) {
            bail!("duplicate task id '{}'", task.id);
        }
        if task.description.trim().is_empty() {
            bail!("task {} has an empty description", task.id);
        }
        if !(task.time_estimate.is_finite() && task.time_estimate > 0.0) {
            bail!("task {} has a non-positive time estimate", task.id);
        }
        if let Some(ref worker_id) = task.assigned_to
            && !worker_ids.contains(worker_id.as_str())
        {
            bail!(
                "task {} is assigned to unknown worker '{}'",
                task.id,
                worker_id
            );
        }
    }

    for worker in &data.workers {
        let held = data.held_hours(&worker.id);
        if held > DAILY_CAPACITY_HOURS + CAPACITY_EPSILON {
            return Err(anyhow!(
                "worker {} holds {}h of open tasks, over the {}h daily limit",
                worker.id,
                held,
                DAILY_CAPACITY_HOURS
            ));
        }
    }

    Ok(())
}

/// Repair derived fields in place, returning a note per repair.
///
/// Worker load is recomputed from the open tasks, and id counters are moved
/// past the highest id in use so no id is ever minted twice.
pub fn reconcile(data: &mut WorkerManagementData) -> Vec<String> {
    let mut notes = Vec::new();

    let loads: Vec<f64> = data
        .workers
        .iter()
        .map(|w| data.held_hours(&w.id))
        .collect();
    for (worker, held) in data.workers.iter_mut().zip(loads) {
        if (worker.total_assigned_hours - held).abs() > CAPACITY_EPSILON {
            notes.push(format!(
                "worker {} load {}h recomputed as {}h",
                worker.id, worker.total_assigned_hours, held
            ));
            worker.total_assigned_hours = held;
        }
    }

    let max_worker = data
        .workers
        .iter()
        .filter_map(|w| parse_id(IdKind::Worker, &w.id))
        .max()
        .unwrap_or(0);
    if data.next_worker_id <= max_worker {
        let next = max_worker.saturating_add(1);
        notes.push(format!(
            "nextWorkerId {} advanced to {}",
            data.next_worker_id, next
        ));
        data.next_worker_id = next;
    }

    let max_task = data
        .tasks
        .iter()
        .filter_map(|t| parse_id(IdKind::Task, &t.id))
        .max()
        .unwrap_or(0);
    if data.next_task_id <= max_task {
        let next = max_task.saturating_add(1);
        notes.push(format!("nextTaskId {} advanced to {}", data.next_task_id, next));
        data.next_task_id = next;
    }

    notes
}
