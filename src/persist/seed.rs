//! Starter roster written the first time a store is opened.

use crate::ids::{IdKind, format_id};
use crate::types::{Priority, Task, Worker, WorkerManagementData};
use chrono::{DateTime, Days, Utc};

const SEED_WORKERS: &[&str] = &["Maria Santos", "James Chen", "Aisha Okafor"];

// (description, priority, hours, days until due)
const SEED_TASKS: &[(&str, Priority, f64, u64)] = &[
    ("Deep clean office kitchen", Priority::High, 3.0, 1),
    ("Vacuum conference rooms", Priority::Medium, 2.0, 2),
    ("Restock restroom supplies", Priority::Low, 1.0, 3),
    ("Wash lobby windows", Priority::Medium, 4.0, 5),
];

/// Build the starter roster: a few available workers and unassigned tasks
/// due over the next days.
pub fn default_roster(now: DateTime<Utc>) -> WorkerManagementData {
    let mut data = WorkerManagementData::default();
    let today = now.date_naive();

    for name in SEED_WORKERS {
        data.workers.push(Worker {
            id: format_id(IdKind::Worker, data.next_worker_id),
            name: name.to_string(),
            availability: true,
            total_assigned_hours: 0.0,
        });
        data.next_worker_id += 1;
    }

    for (description, priority, hours, due_in) in SEED_TASKS {
        data.tasks.push(Task {
            id: format_id(IdKind::Task, data.next_task_id),
            description: description.to_string(),
            priority: *priority,
            time_estimate: *hours,
            deadline: today.checked_add_days(Days::new(*due_in)).unwrap_or(today),
            assigned_to: None,
            created_at: now,
            completed: false,
        });
        data.next_task_id += 1;
    }

    data
}
