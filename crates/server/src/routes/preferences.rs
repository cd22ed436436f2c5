use axum::{
    Extension, Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::preferences::{Preferences, UpdatePreferences};
use utils::{response::ApiResponse, time::is_valid_hhmm};

use crate::{AppState, error::ApiError, middleware::Identity};

pub fn router() -> Router<AppState> {
    Router::new().route("/preferences", get(get_preferences).put(put_preferences))
}

async fn get_preferences(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
) -> Result<ResponseJson<ApiResponse<Preferences>>, ApiError> {
    let prefs = Preferences::find_or_default(&state.db.pool, &user_id).await?;
    Ok(ResponseJson(ApiResponse::success(prefs)))
}

async fn put_preferences(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
    Json(payload): Json<UpdatePreferences>,
) -> Result<ResponseJson<ApiResponse<Preferences>>, ApiError> {
    for (field, value) in [
        ("wake_time", payload.wake_time.as_deref()),
        ("sleep_time", payload.sleep_time.as_deref()),
    ] {
        if let Some(time) = value {
            if !is_valid_hhmm(time) {
                return Err(ApiError::BadRequest(format!(
                    "{field} must be HH:MM, got \"{time}\""
                )));
            }
        }
    }
    if matches!(payload.break_interval_minutes, Some(m) if m <= 0) {
        return Err(ApiError::BadRequest(
            "break_interval_minutes must be positive".to_string(),
        ));
    }
    if matches!(payload.max_work_hours, Some(h) if !(1..=24).contains(&h)) {
        return Err(ApiError::BadRequest(
            "max_work_hours must be between 1 and 24".to_string(),
        ));
    }

    let prefs = Preferences::upsert(&state.db.pool, &user_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(prefs)))
}
