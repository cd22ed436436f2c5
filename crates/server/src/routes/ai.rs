use axum::{
    Extension, Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::Utc;
use db::models::{game_score::GameScore, preferences::Preferences, task::Task};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use services::services::{align, context, AlignmentResult};
use ai::{
    extract_structured, prompts, sanitize_response, AiError, CompletionOptions, JsonShape,
    TaskKind,
};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::Identity};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ai/extract-tasks", post(extract_tasks))
        .route("/ai/generate-tasks", post(generate_tasks))
        .route("/ai/align", post(align_now))
        .route("/ai/dictate", post(dictate))
        .route("/ai/ask", post(ask))
        .route("/ai/insights", get(insights))
}

#[derive(Debug, Deserialize)]
struct ExtractTasksRequest {
    transcript: String,
}

/// Transcript → proposed task list → alignment against today's tasks.
async fn extract_tasks(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
    Json(payload): Json<ExtractTasksRequest>,
) -> Result<ResponseJson<ApiResponse<AlignmentResult>>, ApiError> {
    if payload.transcript.trim().is_empty() {
        return Err(ApiError::BadRequest("transcript must not be empty".to_string()));
    }

    let messages = prompts::voice_extraction(&payload.transcript);
    let completion = state
        .ai
        .complete(&messages, TaskKind::VoiceExtraction, &CompletionOptions::default())
        .await?;

    let proposed = extract_structured(&state.ai, &completion.content, JsonShape::Array).await?;
    let ops = proposed.as_array().cloned().unwrap_or_default();

    let today = Utc::now().date_naive();
    let existing = Task::find_for_day(&state.db.pool, &user_id, today).await?;
    let result = align(&state.db.pool, &user_id, today, &existing, &ops).await;
    Ok(ResponseJson(ApiResponse::success(result)))
}

#[derive(Debug, Default, Deserialize)]
struct GenerateTasksRequest {
    #[serde(default)]
    instructions: String,
    /// When true, generated tasks are reconciled and stored immediately;
    /// otherwise they come back as raw proposals.
    #[serde(default)]
    apply: bool,
}

#[derive(Debug, Serialize)]
struct GenerateTasksResponse {
    proposed: Vec<Value>,
    alignment: Option<AlignmentResult>,
}

async fn generate_tasks(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
    Json(payload): Json<GenerateTasksRequest>,
) -> Result<ResponseJson<ApiResponse<GenerateTasksResponse>>, ApiError> {
    let today = Utc::now().date_naive();
    let (tasks, prefs) = tokio::join!(
        Task::find_for_day(&state.db.pool, &user_id, today),
        Preferences::find_or_default(&state.db.pool, &user_id),
    );
    let tasks = tasks?;
    let prefs = prefs?;

    let messages = prompts::task_generation(
        &context::render_preferences(&prefs),
        &context::render_tasks(&tasks),
        &payload.instructions,
    );
    let completion = state
        .ai
        .complete(&messages, TaskKind::TaskGeneration, &CompletionOptions::default())
        .await?;

    // Task generation degrades to an empty proposal list when no JSON can be
    // recovered; plan generation is the strict one.
    let proposed = match extract_structured(&state.ai, &completion.content, JsonShape::Array).await
    {
        Ok(value) => value.as_array().cloned().unwrap_or_default(),
        Err(AiError::ExtractionFailed(reason)) => {
            tracing::warn!("task generation yielded no JSON: {reason}");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    let alignment = if payload.apply && !proposed.is_empty() {
        Some(align(&state.db.pool, &user_id, today, &tasks, &proposed).await)
    } else {
        None
    };

    Ok(ResponseJson(ApiResponse::success(GenerateTasksResponse {
        proposed,
        alignment,
    })))
}

#[derive(Debug, Deserialize)]
struct AlignRequest {
    operations: Vec<Value>,
}

/// Explicit reconciliation of caller-supplied operations.
async fn align_now(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
    Json(payload): Json<AlignRequest>,
) -> Result<ResponseJson<ApiResponse<AlignmentResult>>, ApiError> {
    let today = Utc::now().date_naive();
    let existing = Task::find_for_day(&state.db.pool, &user_id, today).await?;
    let result = align(&state.db.pool, &user_id, today, &existing, &payload.operations).await;
    Ok(ResponseJson(ApiResponse::success(result)))
}

#[derive(Debug, Serialize)]
struct TextResponse {
    text: String,
    model_used: String,
}

/// Natural-language read-aloud of the board, urgent so it comes back fast.
async fn dictate(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
) -> Result<ResponseJson<ApiResponse<TextResponse>>, ApiError> {
    let today = Utc::now().date_naive();
    let tasks = Task::find_for_day(&state.db.pool, &user_id, today).await?;

    let messages = prompts::dictation(&context::render_board(&tasks));
    let options = CompletionOptions {
        urgent: true,
        ..Default::default()
    };
    let completion = state.ai.complete(&messages, TaskKind::Dictation, &options).await?;

    Ok(ResponseJson(ApiResponse::success(TextResponse {
        text: sanitize_response(&completion.content),
        model_used: completion.model_used,
    })))
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    question: String,
}

async fn ask(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
    Json(payload): Json<AskRequest>,
) -> Result<ResponseJson<ApiResponse<TextResponse>>, ApiError> {
    if payload.question.trim().is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }

    let today = Utc::now().date_naive();
    let (tasks, prefs) = tokio::join!(
        Task::find_for_day(&state.db.pool, &user_id, today),
        Preferences::find_or_default(&state.db.pool, &user_id),
    );
    let tasks = tasks?;
    let prefs = prefs?;

    let user_context = format!(
        "Preferences: {}\nTasks:\n{}",
        context::render_preferences(&prefs),
        context::render_tasks(&tasks),
    );
    let messages = prompts::ask(&payload.question, &user_context);
    let completion = state
        .ai
        .complete(&messages, TaskKind::Chat, &CompletionOptions::default())
        .await?;

    Ok(ResponseJson(ApiResponse::success(TextResponse {
        text: sanitize_response(&completion.content),
        model_used: completion.model_used,
    })))
}

async fn insights(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
) -> Result<ResponseJson<ApiResponse<TextResponse>>, ApiError> {
    let today = Utc::now().date_naive();
    let (tasks, score) = tokio::join!(
        Task::find_for_day(&state.db.pool, &user_id, today),
        GameScore::find_by_user(&state.db.pool, &user_id),
    );
    let tasks = tasks?;
    let score = score?;

    let done = tasks.iter().filter(|t| t.status == db::models::task::TaskStatus::Done).count();
    let history = format!(
        "Today: {} tasks, {} done.\n{}\nFocus game high score: {}",
        tasks.len(),
        done,
        context::render_board(&tasks),
        score.map(|s| s.score).unwrap_or(0),
    );
    let messages = prompts::insights(&history);
    let completion = state
        .ai
        .complete(&messages, TaskKind::Insights, &CompletionOptions::default())
        .await?;

    Ok(ResponseJson(ApiResponse::success(TextResponse {
        text: sanitize_response(&completion.content),
        model_used: completion.model_used,
    })))
}
