//! Read-side queries over roster snapshots.
//!
//! Everything here is pure: inputs are borrowed, results are new vectors,
//! and relative order is preserved wherever two items compare equal.

use crate::types::{DAILY_CAPACITY_HOURS, Priority, Task, TaskStats, Worker};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Deadline text format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date.
///
/// The text must re-format to itself, so `2025-1-1` and `2025-02-30` are
/// both rejected.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == value).then_some(date)
}

/// Whether `value` is a real calendar date. Past dates are valid.
pub fn validate_date(value: &str) -> bool {
    parse_date(value).is_some()
}

/// Workers open to new assignments.
///
/// Capacity is not considered; a fully booked worker is still listed.
pub fn available_workers(workers: &[Worker]) -> Vec<Worker> {
    workers.iter().filter(|w| w.availability).cloned().collect()
}

/// Hours a worker can still take on today.
pub fn remaining_capacity(worker: &Worker) -> f64 {
    (DAILY_CAPACITY_HOURS - worker.total_assigned_hours).max(0.0)
}

/// High first, then medium, then low. Stable.
pub fn sort_tasks_by_priority(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by_key(|t| t.priority.rank());
    sorted
}

/// Earliest deadline first. Stable.
pub fn sort_tasks_by_deadline(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by_key(|t| t.deadline);
    sorted
}

/// Newest first. Stable.
pub fn sort_tasks_by_created(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

/// Case-insensitive substring search over description, id and assignee.
pub fn search_tasks(tasks: &[Task], query: &str) -> Vec<Task> {
    let needle = query.to_lowercase();
    tasks
        .iter()
        .filter(|t| {
            t.description.to_lowercase().contains(&needle)
                || t.id.to_lowercase().contains(&needle)
                || t
                    .assigned_to
                    .as_deref()
                    .is_some_and(|w| w.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Task status buckets used by the task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
    Assigned,
    Unassigned,
}

impl StatusFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
            StatusFilter::Assigned => task.is_assigned(),
            StatusFilter::Unassigned => !task.is_assigned(),
        }
    }
}

/// Status and priority filter for task listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: StatusFilter,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(task) && self.priority.is_none_or(|p| task.priority == p)
    }
}

pub fn filter_tasks(tasks: &[Task], filter: &TaskFilter) -> Vec<Task> {
    tasks.iter().filter(|t| filter.matches(t)).cloned().collect()
}

/// Ordering applied to a task listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    None,
    Priority,
    Deadline,
    Created,
}

/// A full task-list request: search, then filter, then sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskView {
    pub query: Option<String>,
    pub filter: TaskFilter,
    pub sort: SortKey,
}

pub fn apply_view(tasks: &[Task], view: &TaskView) -> Vec<Task> {
    let searched = match view.query.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => search_tasks(tasks, q),
        _ => tasks.to_vec(),
    };
    let filtered = filter_tasks(&searched, &view.filter);
    match view.sort {
        SortKey::None => filtered,
        SortKey::Priority => sort_tasks_by_priority(&filtered),
        SortKey::Deadline => sort_tasks_by_deadline(&filtered),
        SortKey::Created => sort_tasks_by_created(&filtered),
    }
}

/// Tasks due less than `hours` from `now`, overdue ones included.
///
/// A deadline counts from midnight UTC at the start of that day. A window
/// too large to represent covers every task (or none, if negative).
pub fn due_within(tasks: &[Task], now: DateTime<Utc>, hours: i64) -> Vec<Task> {
    let Some(window) = Duration::try_hours(hours) else {
        return if hours > 0 { tasks.to_vec() } else { Vec::new() };
    };
    tasks
        .iter()
        .filter(|t| {
            let due = t.deadline.and_time(chrono::NaiveTime::MIN).and_utc();
            due - now < window
        })
        .cloned()
        .collect()
}

/// Dashboard counts.
pub fn task_stats(tasks: &[Task], workers: &[Worker]) -> TaskStats {
    TaskStats {
        total_workers: workers.len(),
        available_workers: workers.iter().filter(|w| w.availability).count(),
        total_tasks: tasks.len(),
        active_tasks: tasks.iter().filter(|t| !t.completed).count(),
        completed_tasks: tasks.iter().filter(|t| t.completed).count(),
        unassigned_tasks: tasks
            .iter()
            .filter(|t| !t.completed && !t.is_assigned())
            .count(),
        assigned_tasks: tasks.iter().filter(|t| t.is_assigned()).count(),
        high_priority_tasks: tasks
            .iter()
            .filter(|t| t.priority == Priority::High)
            .count(),
    }
}
