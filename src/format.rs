//! Output formatting utilities for markdown and JSON.

use crate::query::remaining_capacity;
use crate::types::{DAILY_CAPACITY_HOURS, Task, TaskStats, Worker};
use serde::{Deserialize, Serialize};

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

/// Escape a value for use inside a markdown table cell.
fn cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn hours(value: f64) -> String {
    format!("{}h", value)
}

/// Format a worker list as a markdown table with remaining headroom.
pub fn format_workers_markdown(workers: &[Worker]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Workers ({})\n\n", workers.len()));
    if workers.is_empty() {
        md.push_str("*No workers*\n");
        return md;
    }

    md.push_str("| id | name | available | assigned | remaining |\n");
    md.push_str("| --- | --- | --- | --- | --- |\n");
    for w in workers {
        md.push_str(&format!(
            "| `{}` | {} | {} | {} | {} |\n",
            w.id,
            cell(&w.name),
            if w.availability { "yes" } else { "no" },
            hours(w.total_assigned_hours),
            hours(remaining_capacity(w)),
        ));
    }

    md
}

/// Format a single worker as markdown.
pub fn format_worker_markdown(worker: &Worker) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Worker: {}\n", worker.name));
    md.push_str(&format!("- **id**: `{}`\n", worker.id));
    md.push_str(&format!(
        "- **available**: {}\n",
        if worker.availability { "yes" } else { "no" }
    ));
    md.push_str(&format!(
        "- **assigned**: {} of {} ({} free)\n",
        hours(worker.total_assigned_hours),
        hours(DAILY_CAPACITY_HOURS),
        hours(remaining_capacity(worker))
    ));

    md
}

/// Format a single task as markdown.
pub fn format_task_markdown(task: &Task) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Task: {}\n", task.description));
    md.push_str(&format!("- **id**: `{}`\n", task.id));
    md.push_str(&format!("- **priority**: {}\n", task.priority));
    md.push_str(&format!("- **estimate**: {}\n", hours(task.time_estimate)));
    md.push_str(&format!("- **deadline**: {}\n", task.deadline));

    if let Some(ref worker_id) = task.assigned_to {
        md.push_str(&format!("- **assigned_to**: `{}`\n", worker_id));
    }
    md.push_str(&format!(
        "- **status**: {}\n",
        if task.completed { "completed" } else { "active" }
    ));

    md
}

/// Format a task list as a markdown table.
pub fn format_tasks_markdown(tasks: &[Task]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Tasks ({})\n\n", tasks.len()));
    if tasks.is_empty() {
        md.push_str("*No tasks*\n");
        return md;
    }

    md.push_str("| id | description | priority | estimate | deadline | assigned | status |\n");
    md.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");
    for t in tasks {
        md.push_str(&format!(
            "| `{}` | {} | {} | {} | {} | {} | {} |\n",
            t.id,
            cell(&t.description),
            t.priority,
            hours(t.time_estimate),
            t.deadline,
            t.assigned_to.as_deref().unwrap_or("-"),
            if t.completed { "completed" } else { "active" },
        ));
    }

    md
}

/// Format dashboard counts as markdown.
pub fn format_stats_markdown(stats: &TaskStats, due_soon: usize, due_soon_hours: i64) -> String {
    let mut md = String::new();

    md.push_str("# Dashboard\n\n");
    md.push_str(&format!(
        "- **workers**: {} ({} available)\n",
        stats.total_workers, stats.available_workers
    ));
    md.push_str(&format!("- **tasks**: {}\n", stats.total_tasks));
    md.push_str(&format!("  - active: {}\n", stats.active_tasks));
    md.push_str(&format!("  - completed: {}\n", stats.completed_tasks));
    md.push_str(&format!("  - unassigned: {}\n", stats.unassigned_tasks));
    md.push_str(&format!("  - assigned: {}\n", stats.assigned_tasks));
    md.push_str(&format!("  - high priority: {}\n", stats.high_priority_tasks));
    md.push_str(&format!(
        "- **due in {}h**: {}\n",
        due_soon_hours, due_soon
    ));

    md
}
