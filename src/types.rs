//! Core types for the crew dispatch engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Daily ceiling on a worker's assigned, uncompleted task hours.
pub const DAILY_CAPACITY_HOURS: f64 = 8.0;

/// Slack allowed when comparing summed hours against the capacity ceiling.
pub const CAPACITY_EPSILON: f64 = 1e-9;

/// Task priority.
///
/// Declaration order is the sort order: high first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Sort rank, lower sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A crew member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    /// `W` followed by a zero-padded sequence number, e.g. `W001`.
    pub id: String,
    pub name: String,
    /// Whether the worker can take new assignments.
    pub availability: bool,
    /// Hours of assigned, uncompleted work.
    pub total_assigned_hours: f64,
}

/// A cleaning job in the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// `T` followed by a zero-padded sequence number, e.g. `T001`.
    pub id: String,
    pub description: String,
    pub priority: Priority,
    /// Estimated effort in hours.
    pub time_estimate: f64,
    pub deadline: NaiveDate,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed: bool,
}

impl Task {
    pub fn is_assigned(&self) -> bool {
        self.assigned_to.is_some()
    }

    /// Whether this task counts against its worker's capacity.
    pub fn holds_capacity(&self) -> bool {
        self.assigned_to.is_some() && !self.completed
    }
}

/// The persisted state of the whole roster.
///
/// This is the exact shape handed to the key-value collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerManagementData {
    pub workers: Vec<Worker>,
    pub tasks: Vec<Task>,
    pub next_worker_id: u32,
    pub next_task_id: u32,
}

impl Default for WorkerManagementData {
    fn default() -> Self {
        Self {
            workers: Vec::new(),
            tasks: Vec::new(),
            next_worker_id: 1,
            next_task_id: 1,
        }
    }
}

impl WorkerManagementData {
    pub fn worker(&self, worker_id: &str) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == worker_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub(crate) fn worker_mut(&mut self, worker_id: &str) -> Option<&mut Worker> {
        self.workers.iter_mut().find(|w| w.id == worker_id)
    }

    pub(crate) fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    /// Sum of hours held by uncompleted tasks assigned to `worker_id`.
    pub fn held_hours(&self, worker_id: &str) -> f64 {
        self.tasks
            .iter()
            .filter(|t| t.holds_capacity() && t.assigned_to.as_deref() == Some(worker_id))
            .map(|t| t.time_estimate)
            .sum()
    }
}

/// Result of an assignment-changing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub task: Task,
    /// The worker whose load changed, if any.
    pub worker: Option<Worker>,
}

/// Aggregate counts shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total_workers: usize,
    pub available_workers: usize,
    pub total_tasks: usize,
    pub active_tasks: usize,
    pub completed_tasks: usize,
    /// Active tasks with no worker.
    pub unassigned_tasks: usize,
    pub assigned_tasks: usize,
    pub high_priority_tasks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_high_first() {
        let mut ps = vec![Priority::Low, Priority::High, Priority::Medium];
        ps.sort();
        assert_eq!(ps, vec![Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn snapshot_uses_camel_case_shape() {
        let data = WorkerManagementData::default();
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["nextWorkerId"], 1);
        assert_eq!(value["nextTaskId"], 1);
        assert!(value["workers"].as_array().unwrap().is_empty());
    }

    #[test]
    fn task_serializes_dates_as_iso_text() {
        let task = Task {
            id: "T001".into(),
            description: "Mop floors".into(),
            priority: Priority::High,
            time_estimate: 2.5,
            deadline: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
            assigned_to: None,
            created_at: DateTime::parse_from_rfc3339("2025-03-01T08:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            completed: false,
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["deadline"], "2025-03-09");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["timeEstimate"], 2.5);
        assert!(value["assignedTo"].is_null());
    }
}
