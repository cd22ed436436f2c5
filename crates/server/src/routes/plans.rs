use axum::{
    Extension, Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use db::models::{plan::Plan, preferences::Preferences};
use serde::{Deserialize, Serialize};
use services::services::{generate_plan, AstronomyPicture, WeatherReport};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::Identity};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plan", get(get_plan))
        .route("/plan/generate", post(generate))
}

#[derive(Debug, Serialize)]
pub struct PlanContext {
    pub plan_date: NaiveDate,
    pub plan: serde_json::Value,
    pub weather: Option<WeatherReport>,
    pub astronomy: Option<AstronomyPicture>,
}

async fn get_plan(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
) -> Result<ResponseJson<ApiResponse<serde_json::Value>>, ApiError> {
    let today = Utc::now().date_naive();
    let plan = Plan::find_for_day(&state.db.pool, &user_id, today)
        .await?
        .ok_or_else(|| ApiError::NotFound("no plan generated for today yet".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(plan.body())))
}

#[derive(Debug, Default, Deserialize)]
struct GeneratePlanRequest {
    #[serde(default)]
    custom_instructions: String,
}

async fn generate(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
    Json(payload): Json<GeneratePlanRequest>,
) -> Result<ResponseJson<ApiResponse<PlanContext>>, ApiError> {
    let today = Utc::now().date_naive();
    let prefs = Preferences::find_or_default(&state.db.pool, &user_id).await?;

    // Weather and the astronomy picture are independent lookups; both degrade
    // to None instead of blocking plan generation.
    let (weather, astronomy) = tokio::join!(
        state.weather.current(&prefs.city),
        state.astronomy.picture_of_the_day(),
    );
    let weather = weather
        .inspect_err(|e| tracing::warn!("weather unavailable: {e}"))
        .ok();
    let astronomy = astronomy
        .inspect_err(|e| tracing::warn!("astronomy picture unavailable: {e}"))
        .ok();

    let weather_summary = weather
        .as_ref()
        .map(WeatherReport::summary)
        .unwrap_or_else(|| "weather unavailable".to_string());

    let plan = generate_plan(
        &state.db.pool,
        &state.ai,
        &user_id,
        today,
        &prefs,
        &weather_summary,
        &payload.custom_instructions,
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(PlanContext {
        plan_date: plan.plan_date,
        plan: plan.body(),
        weather,
        astronomy,
    })))
}
