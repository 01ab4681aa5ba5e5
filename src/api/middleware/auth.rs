use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::middleware::error::ApiError;
use crate::api::AppState;

/// The external scheduler attaches the configured access token to every
/// step callback; reject anything that does not carry it.
pub async fn require_access_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header);
    if token != state.access_token {
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}
