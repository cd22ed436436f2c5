//! Renders stored state into plain text for prompt construction.

use db::models::preferences::Preferences;
use db::models::task::{Task, TaskStatus};

pub fn render_preferences(prefs: &Preferences) -> String {
    let city = if prefs.city.trim().is_empty() {
        "(not set)"
    } else {
        prefs.city.as_str()
    };
    format!(
        "wake {} / sleep {}, peak focus: {}, city: {}, break style: {} every {} min, \
         max {} work hours, commute: {}",
        prefs.wake_time,
        prefs.sleep_time,
        format!("{:?}", prefs.peak_focus).to_lowercase(),
        city,
        prefs.break_style,
        prefs.break_interval_minutes,
        prefs.max_work_hours,
        format!("{:?}", prefs.commute_mode).to_lowercase(),
    )
}

/// One line per task, including the real id so alignment-feeding prompts can
/// reference tasks unambiguously.
pub fn render_tasks(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "(no tasks yet)".to_string();
    }
    tasks
        .iter()
        .map(|t| {
            let time = t.scheduled_time.as_deref().unwrap_or("unscheduled");
            format!(
                "- [{}] {} ({} min, importance {}, status {}, {})",
                t.id,
                t.title,
                t.duration_minutes,
                format!("{:?}", t.importance).to_lowercase(),
                format!("{:?}", t.status).to_lowercase(),
                time
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Kanban-style grouping used by the dictation and insights features.
pub fn render_board(tasks: &[Task]) -> String {
    let mut out = String::new();
    for (status, label) in [
        (TaskStatus::Backlog, "Backlog"),
        (TaskStatus::Todo, "To do"),
        (TaskStatus::Doing, "In progress"),
        (TaskStatus::Done, "Done"),
    ] {
        let column: Vec<&Task> = tasks.iter().filter(|t| t.status == status).collect();
        out.push_str(&format!("{label} ({}):\n", column.len()));
        for task in column {
            out.push_str(&format!("  - {} ({} min)\n", task.title, task.duration_minutes));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use db::models::task::Importance;
    use uuid::Uuid;

    fn task(title: &str, status: TaskStatus) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: "u".to_string(),
            title: title.to_string(),
            duration_minutes: 30,
            importance: Importance::Medium,
            status,
            scheduled_time: None,
            task_date: Utc::now().date_naive(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn board_groups_by_status() {
        let tasks = vec![task("Write report", TaskStatus::Doing), task("Call bank", TaskStatus::Done)];
        let board = render_board(&tasks);
        assert!(board.contains("In progress (1):\n  - Write report"));
        assert!(board.contains("Done (1):\n  - Call bank"));
        assert!(board.contains("Backlog (0):"));
    }

    #[test]
    fn empty_task_list_renders_placeholder() {
        assert_eq!(render_tasks(&[]), "(no tasks yet)");
    }
}
