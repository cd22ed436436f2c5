//! Reconciles AI-proposed task operations against a user's real task list.
//!
//! The contract of [`align`] is that it never fails: every operation either
//! applies cleanly or turns into a [`Conflict`], and the batch keeps going.
//! The only exception is a fatal storage error (pool gone, connection dead),
//! which stops further passes and returns everything applied so far with
//! `aborted` set.

use chrono::NaiveDate;
use db::models::task::{CreateTask, Importance, Task, TaskStatus};
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use uuid::Uuid;

const MIN_DURATION_MINUTES: i64 = 5;
const MAX_DURATION_MINUTES: i64 = 480;
const DUPLICATE_PREFIX_CHARS: usize = 20;

/// Why a proposed operation was not applied, plus what the caller (or the
/// model, next round) could do about it.
#[derive(Debug, Clone, Serialize)]
pub struct Conflict {
    pub issue: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedTask {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Default, Serialize)]
pub struct AlignmentResult {
    pub inserted_tasks: Vec<Task>,
    pub modified_tasks: Vec<Task>,
    pub deleted_tasks: Vec<DeletedTask>,
    pub conflicts: Vec<Conflict>,
    /// True when a fatal storage error cut the batch short. Everything in the
    /// other fields was applied before the cut and stays applied.
    pub aborted: bool,
}

enum OpKind {
    Create,
    Delete,
    Modify,
}

/// Maps the loose `action` field onto one of the three operation shapes.
/// Anything else is unclassifiable and becomes a conflict at the boundary.
fn classify(op: &Value) -> Option<OpKind> {
    if !op.is_object() {
        return None;
    }
    match op.get("action") {
        None | Some(Value::Null) => Some(OpKind::Create),
        Some(Value::String(action)) => match action.trim().to_lowercase().as_str() {
            "add" | "create" => Some(OpKind::Create),
            "delete" | "remove" | "completed" => Some(OpKind::Delete),
            "modify" | "update" | "change" => Some(OpKind::Modify),
            _ => None,
        },
        Some(_) => None,
    }
}

/// Exact case-insensitive title match against a real task. Deliberately
/// stricter than the substring heuristic used for duplicate detection; the
/// two policies must stay distinct.
pub fn resolve_by_title<'a>(existing: &'a [Task], title: &str) -> Option<&'a Task> {
    let wanted = title.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    existing
        .iter()
        .find(|t| t.title.trim().to_lowercase() == wanted)
}

/// Strict 8-4-4-4-12 check with version/variant nibbles. `Uuid::parse_str`
/// alone is too permissive (accepts braced, urn and unhyphenated forms), and
/// a model-claimed id gets no benefit of the doubt.
fn parse_strict_uuid(candidate: &str) -> Option<Uuid> {
    let bytes = candidate.as_bytes();
    if bytes.len() != 36 {
        return None;
    }
    for (i, b) in bytes.iter().enumerate() {
        match i {
            8 | 13 | 18 | 23 => {
                if *b != b'-' {
                    return None;
                }
            }
            _ => {
                if !b.is_ascii_hexdigit() {
                    return None;
                }
            }
        }
    }
    let parsed = Uuid::parse_str(candidate).ok()?;
    let version_ok = matches!(parsed.get_version_num(), 1..=5);
    let variant_ok = matches!(parsed.get_variant(), uuid::Variant::RFC4122);
    (version_ok && variant_ok).then_some(parsed)
}

/// True for first-20-chars case-insensitive containment in either direction.
/// A crude heuristic that trades false negatives for simplicity; it is not
/// semantic similarity.
fn is_fuzzy_duplicate(proposed_title: &str, existing_title: &str) -> bool {
    let proposed = proposed_title.trim().to_lowercase();
    let existing = existing_title.trim().to_lowercase();
    let proposed_prefix: String = proposed.chars().take(DUPLICATE_PREFIX_CHARS).collect();
    let existing_prefix: String = existing.chars().take(DUPLICATE_PREFIX_CHARS).collect();
    existing.contains(&proposed_prefix) || proposed.contains(&existing_prefix)
}

/// Connection-level failures abort the batch; anything else is a per-item
/// conflict.
fn is_fatal(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::PoolClosed
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::Io(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::WorkerCrashed
    )
}

fn op_id(op: &Value) -> Option<&str> {
    op.get("id").and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}

fn op_title(op: &Value) -> Option<&str> {
    op.get("title").and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}

fn op_duration(op: &Value) -> Option<i64> {
    op.get("duration")
        .or_else(|| op.get("duration_minutes"))
        .and_then(Value::as_i64)
}

/// Apply a batch of proposed operations for `user_id` against `existing`,
/// the authoritative snapshot of that user's tasks for `day`.
///
/// Three passes in fixed order: create, delete, modify. Later passes consult
/// the pre-batch snapshot, never results produced earlier in the same batch.
pub async fn align(
    pool: &SqlitePool,
    user_id: &str,
    day: NaiveDate,
    existing: &[Task],
    proposed_ops: &[Value],
) -> AlignmentResult {
    let mut result = AlignmentResult::default();

    let mut creates = Vec::new();
    let mut deletes = Vec::new();
    let mut modifies = Vec::new();
    for op in proposed_ops {
        match classify(op) {
            Some(OpKind::Create) => creates.push(op),
            Some(OpKind::Delete) => deletes.push(op),
            Some(OpKind::Modify) => modifies.push(op),
            None => result.conflicts.push(Conflict {
                issue: format!("unrecognized operation shape: {op}"),
                suggestion: "use a create, delete or modify operation".to_string(),
            }),
        }
    }

    if apply_creates(pool, user_id, day, existing, &creates, &mut result).await.is_err() {
        result.aborted = true;
        return result;
    }
    if apply_deletes(pool, user_id, existing, &deletes, &mut result).await.is_err() {
        result.aborted = true;
        return result;
    }
    if apply_modifies(pool, user_id, existing, &modifies, &mut result).await.is_err() {
        result.aborted = true;
    }
    result
}

async fn apply_creates(
    pool: &SqlitePool,
    user_id: &str,
    day: NaiveDate,
    existing: &[Task],
    ops: &[&Value],
    result: &mut AlignmentResult,
) -> Result<(), ()> {
    for op in ops {
        let Some(title) = op_title(op) else {
            result.conflicts.push(Conflict {
                issue: "create operation has a missing or blank title".to_string(),
                suggestion: "every new task needs a non-empty title".to_string(),
            });
            continue;
        };

        let Some(duration) = op_duration(op).filter(|d| *d > 0) else {
            result.conflicts.push(Conflict {
                issue: format!("create operation \"{title}\" has a missing or non-positive duration"),
                suggestion: "supply a duration in minutes greater than zero".to_string(),
            });
            continue;
        };

        if let Some(duplicate) = existing.iter().find(|t| is_fuzzy_duplicate(title, &t.title)) {
            result.conflicts.push(Conflict {
                issue: format!("\"{title}\" looks like a duplicate of an existing task"),
                suggestion: format!("modify the existing task \"{}\" instead", duplicate.title),
            });
            continue;
        }

        let duration = duration.clamp(MIN_DURATION_MINUTES, MAX_DURATION_MINUTES);
        let importance = op
            .get("importance")
            .and_then(Value::as_str)
            .and_then(Importance::parse_loose);
        // scheduled_time is preserved verbatim here; only user-submitted tasks
        // get the HH:MM check at the HTTP boundary.
        let scheduled_time = op
            .get("scheduled_time")
            .or_else(|| op.get("scheduledTime"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let data = CreateTask {
            title: title.to_string(),
            duration_minutes: duration,
            importance,
            status: Some(TaskStatus::Todo),
            scheduled_time,
            task_date: Some(day),
        };
        match Task::create(pool, Uuid::new_v4(), user_id, &data).await {
            Ok(task) => result.inserted_tasks.push(task),
            Err(e) if is_fatal(&e) => {
                tracing::error!("fatal storage error during create pass: {e}");
                return Err(());
            }
            Err(e) => {
                tracing::warn!("create failed for \"{title}\": {e}");
                result.conflicts.push(Conflict {
                    issue: format!("could not store new task \"{title}\": {e}"),
                    suggestion: "retry this task".to_string(),
                });
            }
        }
    }
    Ok(())
}

async fn apply_deletes(
    pool: &SqlitePool,
    user_id: &str,
    existing: &[Task],
    ops: &[&Value],
    result: &mut AlignmentResult,
) -> Result<(), ()> {
    for op in ops {
        let Some(claimed_id) = op_id(op) else {
            result.conflicts.push(Conflict {
                issue: "delete operation has no task id".to_string(),
                suggestion: "include the id of the task to delete".to_string(),
            });
            continue;
        };

        let target = match parse_strict_uuid(claimed_id) {
            Some(id) => id,
            None => {
                // The bad id is always a conflict; the rescue below may still
                // make the deletion itself succeed.
                result.conflicts.push(Conflict {
                    issue: format!("invalid UUID format: \"{claimed_id}\""),
                    suggestion: "use the exact id from the task list".to_string(),
                });
                let rescued = op_title(op).and_then(|t| resolve_by_title(existing, t));
                match rescued {
                    Some(task) => task.id,
                    None => continue,
                }
            }
        };

        match Task::delete(pool, target, user_id).await {
            Ok(0) => result.conflicts.push(Conflict {
                issue: format!("no task found with id {target}"),
                suggestion: "it may already be deleted; refresh the task list".to_string(),
            }),
            Ok(_) => {
                let title = existing
                    .iter()
                    .find(|t| t.id == target)
                    .map(|t| t.title.clone())
                    .or_else(|| op_title(op).map(str::to_string))
                    .unwrap_or_default();
                result.deleted_tasks.push(DeletedTask { id: target, title });
            }
            Err(e) if is_fatal(&e) => {
                tracing::error!("fatal storage error during delete pass: {e}");
                return Err(());
            }
            Err(e) => {
                tracing::warn!("delete failed for {target}: {e}");
                result.conflicts.push(Conflict {
                    issue: format!("could not delete task {target}: {e}"),
                    suggestion: "retry this deletion".to_string(),
                });
            }
        }
    }
    Ok(())
}

async fn apply_modifies(
    pool: &SqlitePool,
    user_id: &str,
    existing: &[Task],
    ops: &[&Value],
    result: &mut AlignmentResult,
) -> Result<(), ()> {
    for op in ops {
        let Some(claimed_id) = op_id(op) else {
            result.conflicts.push(Conflict {
                issue: "modify operation has no task id".to_string(),
                suggestion: "include the id of the task to modify".to_string(),
            });
            continue;
        };

        let target = match parse_strict_uuid(claimed_id) {
            Some(id) => id,
            None => {
                result.conflicts.push(Conflict {
                    issue: format!("invalid UUID format: \"{claimed_id}\""),
                    suggestion: "use the exact id from the task list".to_string(),
                });
                let rescued = op_title(op).and_then(|t| resolve_by_title(existing, t));
                match rescued {
                    Some(task) => task.id,
                    None => continue,
                }
            }
        };

        // Merge needs the task's current values, fetched fresh rather than
        // from the snapshot so a stale snapshot cannot resurrect old fields.
        let current = match Task::find_by_id_and_user(pool, target, user_id).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                result.conflicts.push(Conflict {
                    issue: format!("no task found for modification with id {target}"),
                    suggestion: "refresh the task list before modifying".to_string(),
                });
                continue;
            }
            Err(e) if is_fatal(&e) => {
                tracing::error!("fatal storage error during modify pass: {e}");
                return Err(());
            }
            Err(e) => {
                result.conflicts.push(Conflict {
                    issue: format!("could not load task {target}: {e}"),
                    suggestion: "retry this modification".to_string(),
                });
                continue;
            }
        };

        // Field-level merge: proposed value when present, current value
        // otherwise. Never a full overwrite.
        let title = op_title(op).map(str::to_string).unwrap_or(current.title);
        let duration_minutes = op_duration(op)
            .filter(|d| *d > 0)
            .map(|d| d.clamp(MIN_DURATION_MINUTES, MAX_DURATION_MINUTES))
            .unwrap_or(current.duration_minutes);
        let importance = op
            .get("importance")
            .and_then(Value::as_str)
            .and_then(Importance::parse_loose)
            .unwrap_or(current.importance);
        let status = op
            .get("status")
            .and_then(Value::as_str)
            .and_then(TaskStatus::parse_loose)
            .unwrap_or(current.status);
        let scheduled_time = op
            .get("scheduled_time")
            .or_else(|| op.get("scheduledTime"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or(current.scheduled_time);

        match Task::update(
            pool,
            target,
            user_id,
            title,
            duration_minutes,
            importance,
            status,
            scheduled_time,
        )
        .await
        {
            Ok(Some(task)) => result.modified_tasks.push(task),
            Ok(None) => result.conflicts.push(Conflict {
                issue: format!("no task found for modification with id {target}"),
                suggestion: "refresh the task list before modifying".to_string(),
            }),
            Err(e) if is_fatal(&e) => {
                tracing::error!("fatal storage error during modify pass: {e}");
                return Err(());
            }
            Err(e) => {
                tracing::warn!("modify failed for {target}: {e}");
                result.conflicts.push(Conflict {
                    issue: format!("could not modify task {target}: {e}"),
                    suggestion: "retry this modification".to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use db::models::test_utils::setup_test_pool;
    use serde_json::json;

    async fn seed_task(pool: &SqlitePool, user: &str, title: &str) -> Task {
        Task::create(
            pool,
            Uuid::new_v4(),
            user,
            &CreateTask {
                title: title.to_string(),
                duration_minutes: 60,
                importance: None,
                status: None,
                scheduled_time: None,
                task_date: Some(Utc::now().date_naive()),
            },
        )
        .await
        .expect("seed task")
    }

    async fn seed_task_with_id(pool: &SqlitePool, user: &str, id: Uuid, title: &str) -> Task {
        Task::create(
            pool,
            id,
            user,
            &CreateTask {
                title: title.to_string(),
                duration_minutes: 60,
                importance: None,
                status: None,
                scheduled_time: None,
                task_date: Some(Utc::now().date_naive()),
            },
        )
        .await
        .expect("seed task")
    }

    #[tokio::test]
    async fn inserts_a_simple_create() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();
        let ops = vec![json!({"title": "Call mom", "duration": 15, "importance": "medium"})];

        let result = align(&pool, "u1", day, &[], &ops).await;

        assert_eq!(result.inserted_tasks.len(), 1);
        assert_eq!(result.inserted_tasks[0].title, "Call mom");
        assert_eq!(result.inserted_tasks[0].status, TaskStatus::Todo);
        assert!(result.conflicts.is_empty());
        assert!(!result.aborted);
    }

    #[tokio::test]
    async fn blank_title_and_bad_duration_never_touch_storage() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();
        let ops = vec![
            json!({"title": "   ", "duration": 30}),
            json!({"title": "Stretch", "duration": 0}),
            json!({"title": "Nap", "duration": -10}),
            json!({"title": "No duration at all"}),
        ];

        let result = align(&pool, "u1", day, &[], &ops).await;

        assert!(result.inserted_tasks.is_empty());
        assert_eq!(result.conflicts.len(), 4);
        let stored = Task::find_for_day(&pool, "u1", day).await.unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn fuzzy_duplicate_is_rejected_both_directions() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();
        let existing = vec![seed_task(&pool, "u1", "Write the quarterly report for finance").await];

        // Proposed prefix appears inside the existing title.
        let ops = vec![json!({"title": "write the quarterly report", "duration": 30})];
        let result = align(&pool, "u1", day, &existing, &ops).await;
        assert!(result.inserted_tasks.is_empty());
        assert_eq!(result.conflicts.len(), 1);
        assert!(result.conflicts[0].suggestion.contains("Write the quarterly report for finance"));

        // Existing prefix appears inside the proposed title.
        let short = vec![seed_task(&pool, "u2", "Gym").await];
        let ops = vec![json!({"title": "Gym session with Alex", "duration": 45})];
        let result = align(&pool, "u2", day, &short, &ops).await;
        assert!(result.inserted_tasks.is_empty());
        assert_eq!(result.conflicts.len(), 1);

        // Unrelated titles pass.
        let ops = vec![json!({"title": "Water the plants", "duration": 10})];
        let result = align(&pool, "u1", day, &existing, &ops).await;
        assert_eq!(result.inserted_tasks.len(), 1);
        assert!(result.conflicts.is_empty());
    }

    #[tokio::test]
    async fn delete_without_id_is_a_conflict_with_no_mutation() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();
        let existing = vec![seed_task(&pool, "u1", "Workout").await];

        let ops = vec![json!({"action": "delete", "title": "Workout"})];
        let result = align(&pool, "u1", day, &existing, &ops).await;

        assert!(result.deleted_tasks.is_empty());
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(Task::find_for_day(&pool, "u1", day).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_id_rescued_by_exact_title_match() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();
        let real_id = Uuid::parse_str("123e4567-e89b-12d3-a456-426614174000").unwrap();
        let existing = vec![seed_task_with_id(&pool, "u1", real_id, "Workout").await];

        let ops = vec![json!({"action": "delete", "id": "not-a-uuid", "title": "Workout"})];
        let result = align(&pool, "u1", day, &existing, &ops).await;

        // Rescue succeeds against the real id, and the bad format is still
        // recorded as a conflict.
        assert_eq!(result.deleted_tasks.len(), 1);
        assert_eq!(result.deleted_tasks[0].id, real_id);
        assert_eq!(result.deleted_tasks[0].title, "Workout");
        assert_eq!(result.conflicts.len(), 1);
        assert!(result.conflicts[0].issue.contains("invalid UUID format"));
        assert!(Task::find_for_day(&pool, "u1", day).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rescue_is_case_insensitive_but_exact() {
        let pool = setup_test_pool().await;
        let existing = vec![seed_task(&pool, "u1", "Workout").await];

        assert!(resolve_by_title(&existing, "WORKOUT").is_some());
        assert!(resolve_by_title(&existing, "workout ").is_some());
        // Substring is not enough for rescue, unlike duplicate detection.
        assert!(resolve_by_title(&existing, "Work").is_none());
        assert!(resolve_by_title(&existing, "").is_none());
    }

    #[tokio::test]
    async fn unknown_well_formed_id_reports_no_task_found() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();

        let ops = vec![json!({"action": "delete", "id": "00000000-0000-1000-8000-000000000000"})];
        let result = align(&pool, "u1", day, &[], &ops).await;

        assert!(result.deleted_tasks.is_empty());
        assert_eq!(result.conflicts.len(), 1);
        assert!(result.conflicts[0].issue.contains("no task found with id"));
    }

    #[tokio::test]
    async fn second_identical_delete_conflicts() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();
        let task = seed_task(&pool, "u1", "One-shot").await;
        let existing = vec![task.clone()];
        let ops = vec![json!({"action": "delete", "id": task.id.to_string()})];

        let first = align(&pool, "u1", day, &existing, &ops).await;
        assert_eq!(first.deleted_tasks.len(), 1);
        assert!(first.conflicts.is_empty());

        let second = align(&pool, "u1", day, &existing, &ops).await;
        assert!(second.deleted_tasks.is_empty());
        assert_eq!(second.conflicts.len(), 1);
        assert!(second.conflicts[0].issue.contains("no task found"));
    }

    #[tokio::test]
    async fn modify_merges_only_provided_fields() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();
        let task = Task::create(
            &pool,
            Uuid::new_v4(),
            "u1",
            &CreateTask {
                title: "Draft report".to_string(),
                duration_minutes: 60,
                importance: Some(Importance::High),
                status: Some(TaskStatus::Todo),
                scheduled_time: None,
                task_date: Some(day),
            },
        )
        .await
        .unwrap();
        let existing = vec![task.clone()];

        let ops = vec![json!({"id": task.id.to_string(), "action": "modify", "status": "done"})];
        let result = align(&pool, "u1", day, &existing, &ops).await;

        assert_eq!(result.modified_tasks.len(), 1);
        let modified = &result.modified_tasks[0];
        assert_eq!(modified.title, "Draft report");
        assert_eq!(modified.duration_minutes, 60);
        assert_eq!(modified.importance, Importance::High);
        assert_eq!(modified.status, TaskStatus::Done);
        assert!(result.conflicts.is_empty());
    }

    #[tokio::test]
    async fn modify_with_malformed_id_rescues_by_title() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();
        let task = seed_task(&pool, "u1", "Plan the trip").await;
        let existing = vec![task.clone()];

        let ops = vec![json!({
            "action": "update",
            "id": "task-42",
            "title": "Plan the trip",
            "duration": 90
        })];
        let result = align(&pool, "u1", day, &existing, &ops).await;

        assert_eq!(result.modified_tasks.len(), 1);
        assert_eq!(result.modified_tasks[0].id, task.id);
        assert_eq!(result.modified_tasks[0].duration_minutes, 90);
        assert_eq!(result.conflicts.len(), 1);
        assert!(result.conflicts[0].issue.contains("invalid UUID format"));
    }

    #[tokio::test]
    async fn modify_cannot_cross_user_boundaries() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();
        let task = seed_task(&pool, "owner", "Private").await;

        let ops = vec![json!({"action": "modify", "id": task.id.to_string(), "status": "done"})];
        let result = align(&pool, "intruder", day, &[], &ops).await;

        assert!(result.modified_tasks.is_empty());
        assert_eq!(result.conflicts.len(), 1);
        let untouched = Task::find_by_id_and_user(&pool, task.id, "owner")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn unclassifiable_operations_become_conflicts() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();
        let ops = vec![
            json!({"action": "explode", "id": "whatever"}),
            json!("not even an object"),
            json!({"action": 7}),
        ];

        let result = align(&pool, "u1", day, &[], &ops).await;
        assert_eq!(result.conflicts.len(), 3);
        assert!(result.inserted_tasks.is_empty());
    }

    #[tokio::test]
    async fn mixed_batch_applies_what_it_can() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();
        let keep = seed_task(&pool, "u1", "Morning review").await;
        let stale = seed_task(&pool, "u1", "Old errand").await;
        let existing = vec![keep.clone(), stale.clone()];

        let ops = vec![
            json!({"title": "Evening walk", "duration": 20}),
            json!({"action": "delete", "id": stale.id.to_string()}),
            json!({"action": "modify", "id": keep.id.to_string(), "status": "doing"}),
            json!({"title": "", "duration": 5}),
        ];
        let result = align(&pool, "u1", day, &existing, &ops).await;

        assert_eq!(result.inserted_tasks.len(), 1);
        assert_eq!(result.deleted_tasks.len(), 1);
        assert_eq!(result.modified_tasks.len(), 1);
        assert_eq!(result.conflicts.len(), 1);
        assert!(!result.aborted);
    }

    #[tokio::test]
    async fn ai_scheduled_time_is_preserved_verbatim() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();
        // Not HH:MM, still stored as-is at this layer.
        let ops = vec![json!({"title": "Watch the eclipse", "duration": 30, "scheduled_time": "around 9pm"})];

        let result = align(&pool, "u1", day, &[], &ops).await;
        assert_eq!(
            result.inserted_tasks[0].scheduled_time.as_deref(),
            Some("around 9pm")
        );
    }

    #[tokio::test]
    async fn duration_is_clamped_for_ai_inserts() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();
        let ops = vec![
            json!({"title": "Blink", "duration": 1}),
            json!({"title": "Marathon of work", "duration": 3000}),
        ];

        let result = align(&pool, "u1", day, &[], &ops).await;
        assert_eq!(result.inserted_tasks[0].duration_minutes, 5);
        assert_eq!(result.inserted_tasks[1].duration_minutes, 480);
    }

    #[tokio::test]
    async fn fatal_storage_error_aborts_but_keeps_prior_work() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();
        pool.close().await;

        let ops = vec![json!({"title": "Never stored", "duration": 30})];
        let result = align(&pool, "u1", day, &[], &ops).await;

        assert!(result.aborted);
        assert!(result.inserted_tasks.is_empty());
    }

    #[test]
    fn strict_uuid_rejects_lenient_forms() {
        assert!(parse_strict_uuid("123e4567-e89b-12d3-a456-426614174000").is_some());
        assert!(parse_strict_uuid("123e4567e89b12d3a456426614174000").is_none());
        assert!(parse_strict_uuid("{123e4567-e89b-12d3-a456-426614174000}").is_none());
        assert!(parse_strict_uuid("urn:uuid:123e4567-e89b-12d3-a456-426614174000").is_none());
        // Version nibble 0 is out of range.
        assert!(parse_strict_uuid("123e4567-e89b-02d3-a456-426614174000").is_none());
        // Variant nibble outside RFC 4122.
        assert!(parse_strict_uuid("123e4567-e89b-12d3-c456-426614174000").is_none());
        assert!(parse_strict_uuid("not-a-uuid").is_none());
    }
}
