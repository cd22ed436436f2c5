//! Identity middleware. Token verification happens upstream; by the time a
//! request reaches us, the verified subject arrives in `x-auth-subject`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use db::models::user::User;

use crate::{AppState, error::ApiError};

/// Authenticated user identity, inserted by [`require_identity`] and read by
/// handlers through `Extension<Identity>`.
#[derive(Debug, Clone)]
pub struct Identity(pub String);

pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let subject = request
        .headers()
        .get("x-auth-subject")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Unauthorized("missing authenticated subject".to_string()))?;

    // Best-effort: a missing users row must not block the request.
    if let Err(e) = User::ensure_exists(&state.db.pool, &subject).await {
        tracing::warn!("could not ensure user row for {subject}: {e}");
    }

    request.extensions_mut().insert(Identity(subject));
    Ok(next.run(request).await)
}
