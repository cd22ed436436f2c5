use axum::{
    Extension, Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::game_score::GameScore;
use serde::{Deserialize, Serialize};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::Identity};

pub fn router() -> Router<AppState> {
    Router::new().route("/score", get(get_score).post(save_score))
}

#[derive(Debug, Serialize)]
struct ScoreResponse {
    score: i64,
    all_time_max: i64,
}

async fn get_score(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
) -> Result<ResponseJson<ApiResponse<ScoreResponse>>, ApiError> {
    let (score, all_time_max) = tokio::join!(
        GameScore::find_by_user(&state.db.pool, &user_id),
        GameScore::all_time_max(&state.db.pool),
    );
    Ok(ResponseJson(ApiResponse::success(ScoreResponse {
        score: score?.map(|s| s.score).unwrap_or(0),
        all_time_max: all_time_max?,
    })))
}

#[derive(Debug, Deserialize)]
struct SaveScoreRequest {
    score: i64,
}

async fn save_score(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
    Json(payload): Json<SaveScoreRequest>,
) -> Result<ResponseJson<ApiResponse<ScoreResponse>>, ApiError> {
    if payload.score < 0 {
        return Err(ApiError::BadRequest("score must not be negative".to_string()));
    }
    let saved = GameScore::save(&state.db.pool, &user_id, payload.score).await?;
    let all_time_max = GameScore::all_time_max(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(ScoreResponse {
        score: saved.score,
        all_time_max,
    })))
}
