//! The entity store: single owner of the roster data.
//!
//! Mutations run against a copy of the data, are written through to the
//! key-value backend, and only then replace the live copy. A rejected
//! operation or a failed write leaves the store untouched.

use crate::error::{EngineError, EngineResult};
use crate::export::csv::tasks_to_csv;
use crate::persist::{
    KeyValueStore, check_integrity, initialize_data, reconcile, save_snapshot,
};
use crate::query;
use crate::types::{Task, TaskStats, Worker, WorkerManagementData};
use tracing::{debug, warn};

/// Roster store handle wrapping the data and its persistence backend.
pub struct EntityStore {
    data: WorkerManagementData,
    backend: Box<dyn KeyValueStore>,
}

impl EntityStore {
    /// Open a store on `backend`, seeding a starter roster if it is empty
    /// and `seed_defaults` is set.
    pub fn open(mut backend: Box<dyn KeyValueStore>, seed_defaults: bool) -> EngineResult<Self> {
        let data =
            initialize_data(backend.as_mut(), seed_defaults).map_err(EngineError::load_failed)?;
        Ok(Self { data, backend })
    }

    /// Open with an empty roster, ignoring whatever the backend holds.
    ///
    /// Nothing is written until the first mutation, which lets an import
    /// overwrite a stored snapshot that no longer loads.
    pub fn open_empty(backend: Box<dyn KeyValueStore>) -> Self {
        Self {
            data: WorkerManagementData::default(),
            backend,
        }
    }

    /// Re-run the startup load against the backend.
    ///
    /// When a snapshot is already stored this reloads it; nothing is reset.
    pub fn initialize_data(&mut self, seed_defaults: bool) -> EngineResult<()> {
        self.data = initialize_data(self.backend.as_mut(), seed_defaults)
            .map_err(EngineError::load_failed)?;
        Ok(())
    }

    /// Apply `op` atomically and persist the result.
    pub(crate) fn commit<T, F>(&mut self, op: F) -> EngineResult<T>
    where
        F: FnOnce(&mut WorkerManagementData) -> EngineResult<T>,
    {
        let mut next = self.data.clone();
        let out = op(&mut next)?;
        if let Err(e) = save_snapshot(self.backend.as_mut(), &next) {
            warn!(error = %e, "Write-through failed; roster left unchanged");
            return Err(e.into());
        }
        self.data = next;
        Ok(out)
    }

    /// Replace the whole roster, e.g. from an imported snapshot.
    ///
    /// The incoming data must pass the same integrity checks as a load.
    pub fn replace_data(&mut self, mut data: WorkerManagementData) -> EngineResult<Vec<String>> {
        check_integrity(&data)
            .map_err(|e| EngineError::invalid("snapshot", format!("{:#}", e)))?;
        let notes = reconcile(&mut data);
        self.commit(move |current| {
            *current = data;
            Ok(())
        })?;
        debug!(repairs = notes.len(), "Replaced roster data");
        Ok(notes)
    }

    /// Copy of the full persisted state.
    pub fn snapshot(&self) -> WorkerManagementData {
        self.data.clone()
    }

    pub fn get_workers(&self) -> Vec<Worker> {
        self.data.workers.clone()
    }

    pub fn get_tasks(&self) -> Vec<Task> {
        self.data.tasks.clone()
    }

    pub fn get_worker(&self, worker_id: &str) -> Option<Worker> {
        self.data.worker(worker_id).cloned()
    }

    pub fn get_task(&self, task_id: &str) -> Option<Task> {
        self.data.task(task_id).cloned()
    }

    /// Workers open to new assignments, regardless of remaining hours.
    pub fn get_available_workers(&self) -> Vec<Worker> {
        query::available_workers(&self.data.workers)
    }

    pub fn search_tasks(&self, query: &str) -> Vec<Task> {
        query::search_tasks(&self.data.tasks, query)
    }

    pub fn export_to_csv(&self) -> String {
        tasks_to_csv(&self.data.tasks)
    }

    pub fn stats(&self) -> TaskStats {
        query::task_stats(&self.data.tasks, &self.data.workers)
    }
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("workers", &self.data.workers.len())
            .field("tasks", &self.data.tasks.len())
            .field("next_worker_id", &self.data.next_worker_id)
            .field("next_task_id", &self.data.next_task_id)
            .finish()
    }
}
