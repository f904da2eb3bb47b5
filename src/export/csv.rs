//! CSV rendering of the task list.

use crate::types::Task;
use chrono::SecondsFormat;

/// Column order of the task export.
pub const CSV_HEADER: &[&str] = &[
    "id",
    "description",
    "priority",
    "timeEstimate",
    "deadline",
    "assignedTo",
    "createdAt",
    "completed",
];

/// Quote a field if it contains a comma, quote or line break.
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn task_row(task: &Task) -> String {
    let fields = [
        task.id.clone(),
        task.description.clone(),
        task.priority.as_str().to_string(),
        task.time_estimate.to_string(),
        task.deadline.format("%Y-%m-%d").to_string(),
        task.assigned_to.clone().unwrap_or_default(),
        task.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        task.completed.to_string(),
    ];
    fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Header plus one line per task, joined with `\n` (no trailing newline).
pub fn tasks_to_csv(tasks: &[Task]) -> String {
    let mut lines = Vec::with_capacity(tasks.len() + 1);
    lines.push(CSV_HEADER.join(","));
    lines.extend(tasks.iter().map(task_row));
    lines.join("\n")
}
