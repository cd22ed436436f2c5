use axum::{Router, middleware::from_fn_with_state};
use tower_http::cors::CorsLayer;

use crate::{AppState, middleware::require_identity};

pub mod ai;
pub mod plans;
pub mod preferences;
pub mod scores;
pub mod tasks;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(tasks::router())
        .merge(preferences::router())
        .merge(plans::router())
        .merge(ai::router())
        .merge(scores::router())
        .layer(from_fn_with_state(state.clone(), require_identity));

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
