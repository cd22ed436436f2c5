//! Daily plan generation: context → prompt → completion → extracted JSON →
//! stored plan. Thin orchestration; the schedule arithmetic itself is the
//! model's job and the output is treated as an opaque plan body.

use ai::{extract_structured, prompts, CompletionOptions, JsonShape, ModelRouter, TaskKind};
use chrono::NaiveDate;
use db::models::plan::Plan;
use db::models::preferences::Preferences;
use db::models::task::Task;
use sqlx::SqlitePool;
use thiserror::Error;

use super::context;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Ai(#[from] ai::AiError),
    #[error("storage error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Generate and persist the plan for (user, day). Replaces any prior plan for
/// that day. Fails when the model's reply yields no JSON object even after a
/// repair round-trip; an unusable plan must not overwrite a good one.
pub async fn generate_plan(
    pool: &SqlitePool,
    router: &ModelRouter,
    user_id: &str,
    day: NaiveDate,
    preferences: &Preferences,
    weather_summary: &str,
    custom_instructions: &str,
) -> Result<Plan, PlannerError> {
    let tasks = Task::find_for_day(pool, user_id, day).await?;

    let messages = prompts::plan_generation(
        &context::render_preferences(preferences),
        &context::render_tasks(&tasks),
        weather_summary,
        custom_instructions,
    );
    let options = CompletionOptions {
        temperature: 0.5,
        max_tokens: 3072,
        ..Default::default()
    };
    let completion = router
        .complete(&messages, TaskKind::PlanGeneration, &options)
        .await?;

    tracing::debug!(
        model = %completion.model_used,
        attempts = completion.attempts,
        "plan completion received"
    );

    let body = extract_structured(router, &completion.content, JsonShape::Object).await?;
    let plan = Plan::upsert(pool, user_id, day, &body).await?;
    Ok(plan)
}
