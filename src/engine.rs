//! Assignment engine: creation, capacity and state-transition rules.
//!
//! The rule functions operate on a [`WorkerManagementData`] and either apply
//! the whole change or return an error having touched nothing. The
//! [`EntityStore`] methods wrap them with write-through and logging.
//!
//! Task lifecycle:
//!
//! ```text
//! Unassigned --assign--> Assigned --complete--> Completed
//!      ^                    |
//!      +-----unassign-------+
//! ```

use crate::error::{EngineError, EngineResult, EntityKind};
use crate::ids::{IdKind, mint_id};
use crate::query::parse_date;
use crate::store::EntityStore;
use crate::types::{
    Assignment, CAPACITY_EPSILON, DAILY_CAPACITY_HOURS, Priority, Task, Worker,
    WorkerManagementData,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Remove `hours` from a worker's load, never going below zero.
fn release_hours(worker: &mut Worker, hours: f64) {
    let remaining = worker.total_assigned_hours - hours;
    worker.total_assigned_hours = if remaining < CAPACITY_EPSILON {
        0.0
    } else {
        remaining
    };
}

/// Create a worker. The name is trimmed and must not be blank.
pub fn add_worker(data: &mut WorkerManagementData, name: &str) -> EngineResult<Worker> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::invalid("name", "Worker name is required"));
    }

    let id = mint_id(IdKind::Worker, &mut data.next_worker_id)
        .ok_or_else(|| EngineError::ids_exhausted(EntityKind::Worker))?;
    let worker = Worker {
        id,
        name: name.to_string(),
        availability: true,
        total_assigned_hours: 0.0,
    };
    data.workers.push(worker.clone());
    Ok(worker)
}

/// Create an unassigned task.
///
/// `deadline` must be `YYYY-MM-DD`; past dates are accepted.
pub fn add_task(
    data: &mut WorkerManagementData,
    description: &str,
    priority: Priority,
    time_estimate: f64,
    deadline: &str,
    now: DateTime<Utc>,
) -> EngineResult<Task> {
    let description = description.trim();
    if description.is_empty() {
        return Err(EngineError::invalid(
            "description",
            "Task description is required",
        ));
    }
    if !(time_estimate.is_finite() && time_estimate > 0.0) {
        return Err(EngineError::invalid(
            "time_estimate",
            "Time estimate must be greater than 0",
        ));
    }
    let deadline = parse_date(deadline).ok_or_else(|| {
        EngineError::invalid(
            "deadline",
            format!("Invalid deadline '{}', expected YYYY-MM-DD", deadline),
        )
    })?;

    let id = mint_id(IdKind::Task, &mut data.next_task_id)
        .ok_or_else(|| EngineError::ids_exhausted(EntityKind::Task))?;
    let task = Task {
        id,
        description: description.to_string(),
        priority,
        time_estimate,
        deadline,
        assigned_to: None,
        created_at: now,
        completed: false,
    };
    data.tasks.push(task.clone());
    Ok(task)
}

/// Assign an unassigned, open task to an available worker with room for it.
///
/// Direct reassignment is rejected; unassign first.
pub fn assign_task_to_worker(
    data: &mut WorkerManagementData,
    task_id: &str,
    worker_id: &str,
) -> EngineResult<Assignment> {
    let task = data
        .task(task_id)
        .ok_or_else(|| EngineError::task_not_found(task_id))?;
    let worker = data
        .worker(worker_id)
        .ok_or_else(|| EngineError::worker_not_found(worker_id))?;

    if task.completed {
        return Err(EngineError::already_completed(task_id));
    }
    if let Some(ref current) = task.assigned_to {
        return Err(EngineError::already_assigned(task_id, current));
    }
    if !worker.availability {
        return Err(EngineError::worker_unavailable(worker_id));
    }
    let hours = task.time_estimate;
    if worker.total_assigned_hours + hours > DAILY_CAPACITY_HOURS + CAPACITY_EPSILON {
        return Err(EngineError::over_capacity(
            worker_id,
            worker.total_assigned_hours,
            hours,
            DAILY_CAPACITY_HOURS,
        ));
    }

    // Both lookups succeeded above, so the mutable ones cannot miss.
    let worker = data
        .worker_mut(worker_id)
        .ok_or_else(|| EngineError::worker_not_found(worker_id))?;
    worker.total_assigned_hours += hours;
    let worker = worker.clone();

    let task = data
        .task_mut(task_id)
        .ok_or_else(|| EngineError::task_not_found(task_id))?;
    task.assigned_to = Some(worker_id.to_string());

    Ok(Assignment {
        task: task.clone(),
        worker: Some(worker),
    })
}

/// Return an assigned, open task to the queue and release its hours.
pub fn unassign_task(data: &mut WorkerManagementData, task_id: &str) -> EngineResult<Assignment> {
    let task = data
        .task(task_id)
        .ok_or_else(|| EngineError::task_not_found(task_id))?;
    if task.completed {
        return Err(EngineError::already_completed(task_id));
    }
    let Some(worker_id) = task.assigned_to.clone() else {
        return Err(EngineError::not_assigned(task_id));
    };
    let hours = task.time_estimate;

    let worker = data.worker_mut(&worker_id).map(|w| {
        release_hours(w, hours);
        w.clone()
    });

    let task = data
        .task_mut(task_id)
        .ok_or_else(|| EngineError::task_not_found(task_id))?;
    task.assigned_to = None;

    Ok(Assignment {
        task: task.clone(),
        worker,
    })
}

/// Mark an assigned task completed and free its hours.
///
/// The task keeps `assigned_to` as a record of who did the work.
/// Unassigned tasks cannot be completed.
pub fn complete_task(data: &mut WorkerManagementData, task_id: &str) -> EngineResult<Assignment> {
    let task = data
        .task(task_id)
        .ok_or_else(|| EngineError::task_not_found(task_id))?;
    if task.completed {
        return Err(EngineError::already_completed(task_id));
    }
    let Some(worker_id) = task.assigned_to.clone() else {
        return Err(EngineError::State(format!(
            "Task {} must be assigned before it can be completed",
            task_id
        )));
    };
    let hours = task.time_estimate;

    let worker = data.worker_mut(&worker_id).map(|w| {
        release_hours(w, hours);
        w.clone()
    });

    let task = data
        .task_mut(task_id)
        .ok_or_else(|| EngineError::task_not_found(task_id))?;
    task.completed = true;

    Ok(Assignment {
        task: task.clone(),
        worker,
    })
}

/// Set a worker's availability. Existing assignments are kept.
pub fn update_worker_availability(
    data: &mut WorkerManagementData,
    worker_id: &str,
    availability: bool,
) -> EngineResult<Worker> {
    let worker = data
        .worker_mut(worker_id)
        .ok_or_else(|| EngineError::worker_not_found(worker_id))?;
    worker.availability = availability;
    Ok(worker.clone())
}

/// Outcome of creating a task with an optional immediate assignment.
#[derive(Debug)]
pub struct TaskIntake {
    pub task: Task,
    pub worker: Option<Worker>,
    /// Why the follow-up assignment was rejected, if it was.
    pub assign_error: Option<EngineError>,
}

fn log_rejection(op: &'static str, err: &EngineError) {
    warn!(op, code = ?err.code(), error = %err, "Operation rejected");
}

impl EntityStore {
    pub fn add_worker(&mut self, name: &str) -> EngineResult<Worker> {
        let worker = self
            .commit(|data| add_worker(data, name))
            .inspect_err(|e| log_rejection("add_worker", e))?;
        info!(worker_id = %worker.id, name = %worker.name, "Worker added");
        Ok(worker)
    }

    pub fn add_task(
        &mut self,
        description: &str,
        priority: Priority,
        time_estimate: f64,
        deadline: &str,
    ) -> EngineResult<Task> {
        let now = Utc::now();
        let task = self
            .commit(|data| add_task(data, description, priority, time_estimate, deadline, now))
            .inspect_err(|e| log_rejection("add_task", e))?;
        info!(
            task_id = %task.id,
            priority = %task.priority,
            hours = task.time_estimate,
            deadline = %task.deadline,
            "Task added"
        );
        Ok(task)
    }

    /// Create a task, then try to assign it to `worker_id`.
    ///
    /// The task is kept even when the assignment is rejected.
    pub fn add_task_and_assign(
        &mut self,
        description: &str,
        priority: Priority,
        time_estimate: f64,
        deadline: &str,
        worker_id: &str,
    ) -> EngineResult<TaskIntake> {
        let task = self.add_task(description, priority, time_estimate, deadline)?;
        match self.assign_task_to_worker(&task.id, worker_id) {
            Ok(assignment) => Ok(TaskIntake {
                task: assignment.task,
                worker: assignment.worker,
                assign_error: None,
            }),
            Err(e) => Ok(TaskIntake {
                task,
                worker: None,
                assign_error: Some(e),
            }),
        }
    }

    pub fn assign_task_to_worker(
        &mut self,
        task_id: &str,
        worker_id: &str,
    ) -> EngineResult<Assignment> {
        let assignment = self
            .commit(|data| assign_task_to_worker(data, task_id, worker_id))
            .inspect_err(|e| log_rejection("assign_task_to_worker", e))?;
        info!(
            task_id,
            worker_id,
            hours = assignment.task.time_estimate,
            worker_load = assignment.worker.as_ref().map(|w| w.total_assigned_hours),
            "Task assigned"
        );
        Ok(assignment)
    }

    pub fn unassign_task(&mut self, task_id: &str) -> EngineResult<Assignment> {
        let assignment = self
            .commit(|data| unassign_task(data, task_id))
            .inspect_err(|e| log_rejection("unassign_task", e))?;
        info!(
            task_id,
            worker_id = assignment.worker.as_ref().map(|w| w.id.as_str()),
            "Task unassigned"
        );
        Ok(assignment)
    }

    pub fn complete_task(&mut self, task_id: &str) -> EngineResult<Assignment> {
        let assignment = self
            .commit(|data| complete_task(data, task_id))
            .inspect_err(|e| log_rejection("complete_task", e))?;
        info!(
            task_id,
            worker_id = assignment.task.assigned_to.as_deref(),
            "Task completed"
        );
        Ok(assignment)
    }

    pub fn update_worker_availability(
        &mut self,
        worker_id: &str,
        availability: bool,
    ) -> EngineResult<Worker> {
        let worker = self
            .commit(|data| update_worker_availability(data, worker_id, availability))
            .inspect_err(|e| log_rejection("update_worker_availability", e))?;
        info!(worker_id, availability, "Worker availability updated");
        Ok(worker)
    }
}
