use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use chrono::Utc;
use db::models::task::{CreateTask, Task, UpdateTask};
use utils::{response::ApiResponse, time::is_valid_hhmm};
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::Identity};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task).delete(clear_tasks))
        .route("/tasks/{id}", put(update_task).delete(delete_task))
}

async fn list_tasks(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
) -> Result<ResponseJson<ApiResponse<Vec<Task>>>, ApiError> {
    let today = Utc::now().date_naive();
    let tasks = Task::find_for_day(&state.db.pool, &user_id, today).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

async fn create_task(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
    Json(payload): Json<CreateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    if payload.duration_minutes <= 0 {
        return Err(ApiError::BadRequest(
            "duration_minutes must be positive".to_string(),
        ));
    }
    if let Some(time) = payload.scheduled_time.as_deref() {
        if !is_valid_hhmm(time) {
            return Err(ApiError::BadRequest(format!(
                "scheduled_time must be HH:MM, got \"{time}\""
            )));
        }
    }

    let task = Task::create(&state.db.pool, Uuid::new_v4(), &user_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

async fn update_task(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    if let Some(title) = payload.title.as_deref() {
        if title.trim().is_empty() {
            return Err(ApiError::BadRequest("title must not be empty".to_string()));
        }
    }
    if matches!(payload.duration_minutes, Some(d) if d <= 0) {
        return Err(ApiError::BadRequest(
            "duration_minutes must be positive".to_string(),
        ));
    }
    if let Some(time) = payload.scheduled_time.as_deref() {
        if !is_valid_hhmm(time) {
            return Err(ApiError::BadRequest(format!(
                "scheduled_time must be HH:MM, got \"{time}\""
            )));
        }
    }

    let existing = Task::find_by_id_and_user(&state.db.pool, id, &user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no task with id {id}")))?;

    // Absent fields keep their current values.
    let updated = Task::update(
        &state.db.pool,
        id,
        &user_id,
        payload.title.unwrap_or(existing.title),
        payload.duration_minutes.unwrap_or(existing.duration_minutes),
        payload.importance.unwrap_or(existing.importance),
        payload.status.unwrap_or(existing.status),
        payload.scheduled_time.or(existing.scheduled_time),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("no task with id {id}")))?;

    Ok(ResponseJson(ApiResponse::success(updated)))
}

async fn delete_task(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows = Task::delete(&state.db.pool, id, &user_id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound(format!("no task with id {id}")));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// Bulk clear of today's tasks; returns how many were removed.
async fn clear_tasks(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
) -> Result<ResponseJson<ApiResponse<u64>>, ApiError> {
    let today = Utc::now().date_naive();
    let removed = Task::delete_for_day(&state.db.pool, &user_id, today).await?;
    Ok(ResponseJson(ApiResponse::success(removed)))
}
