use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use uuid::Uuid;

/// Board column for a task. Display ordering assumes
/// backlog -> todo -> doing -> done, but nothing here enforces transitions.
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Backlog,
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    /// Lenient parse for AI-sourced values; anything unrecognized is None.
    pub fn parse_loose(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "backlog" => Some(TaskStatus::Backlog),
            "todo" | "to do" | "pending" => Some(TaskStatus::Todo),
            "doing" | "in progress" | "in_progress" => Some(TaskStatus::Doing),
            "done" | "complete" | "completed" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
}

impl Importance {
    /// Lenient parse for AI-sourced values; anything unrecognized is None.
    pub fn parse_loose(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(Importance::Low),
            "medium" | "med" | "normal" => Some(Importance::Medium),
            "high" | "urgent" => Some(Importance::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub duration_minutes: i64,
    pub importance: Importance,
    pub status: TaskStatus,
    pub scheduled_time: Option<String>,
    pub task_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub duration_minutes: i64,
    pub importance: Option<Importance>,
    pub status: Option<TaskStatus>,
    pub scheduled_time: Option<String>,
    pub task_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub duration_minutes: Option<i64>,
    pub importance: Option<Importance>,
    pub status: Option<TaskStatus>,
    pub scheduled_time: Option<String>,
}

impl Task {
    pub async fn find_for_day(
        pool: &SqlitePool,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE user_id = $1 AND task_date = $2 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .bind(day)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id_and_user(
        pool: &SqlitePool,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        user_id: &str,
        data: &CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let importance = data.importance.unwrap_or(Importance::Medium);
        let status = data.status.unwrap_or(TaskStatus::Todo);
        let task_date = data
            .task_date
            .unwrap_or_else(|| Utc::now().date_naive());

        sqlx::query_as::<_, Task>(
            r#"INSERT INTO tasks (id, user_id, title, duration_minutes, importance, status, scheduled_time, task_date)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&data.title)
        .bind(data.duration_minutes)
        .bind(importance)
        .bind(status)
        .bind(&data.scheduled_time)
        .bind(task_date)
        .fetch_one(pool)
        .await
    }

    /// Full-row update scoped to (id, user). Returns None when no row matched,
    /// so a caller can distinguish "not found" from other failures.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        user_id: &str,
        title: String,
        duration_minutes: i64,
        importance: Importance,
        status: TaskStatus,
        scheduled_time: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"UPDATE tasks
               SET title = $3, duration_minutes = $4, importance = $5, status = $6,
                   scheduled_time = $7, updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND user_id = $2
               RETURNING *"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(title)
        .bind(duration_minutes)
        .bind(importance)
        .bind(status)
        .bind(scheduled_time)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid, user_id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_for_day(
        pool: &SqlitePool,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE user_id = $1 AND task_date = $2")
            .bind(user_id)
            .bind(day)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_utils::setup_test_pool;

    #[tokio::test]
    async fn create_and_fetch_roundtrip() {
        let pool = setup_test_pool().await;
        let id = Uuid::new_v4();
        let today = Utc::now().date_naive();

        let task = Task::create(
            &pool,
            id,
            "user-1",
            &CreateTask {
                title: "Write weekly report".to_string(),
                duration_minutes: 45,
                importance: Some(Importance::High),
                status: None,
                scheduled_time: Some("09:30".to_string()),
                task_date: Some(today),
            },
        )
        .await
        .expect("create task");

        assert_eq!(task.id, id);
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.importance, Importance::High);

        let fetched = Task::find_for_day(&pool, "user-1", today).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].title, "Write weekly report");
    }

    #[tokio::test]
    async fn delete_is_scoped_to_owner() {
        let pool = setup_test_pool().await;
        let id = Uuid::new_v4();
        Task::create(
            &pool,
            id,
            "owner",
            &CreateTask {
                title: "Private task".to_string(),
                duration_minutes: 30,
                importance: None,
                status: None,
                scheduled_time: None,
                task_date: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(Task::delete(&pool, id, "someone-else").await.unwrap(), 0);
        assert_eq!(Task::delete(&pool, id, "owner").await.unwrap(), 1);
    }

    #[test]
    fn importance_parse_loose() {
        assert_eq!(Importance::parse_loose("HIGH"), Some(Importance::High));
        assert_eq!(Importance::parse_loose(" med "), Some(Importance::Medium));
        assert_eq!(Importance::parse_loose("whenever"), None);
    }
}
