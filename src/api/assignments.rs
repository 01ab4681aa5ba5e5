use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::error;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::api::AppState;
use crate::models::{Reviewer, StepPayload};

/// Step callback target. The external scheduler POSTs the payload it was
/// registered with at approximately the scheduled instant.
pub async fn process_step(
    State(state): State<AppState>,
    Json(payload): Json<StepPayload>,
) -> ApiResult<impl IntoResponse> {
    let step = payload.step.clone();
    let assignment_id = payload.data.id;

    if let Err(e) = state.step_runner.run(payload).await {
        // A failed step sends nothing user-visible; this log line is what a
        // human reconciles from. The scheduler only needs a failure status,
        // so everything surfaces as a 400 regardless of cause.
        error!(step = %step, assignment_id, error = %e, "assignment step failed");
        return Err(ApiError::BadRequest(e.to_string()));
    }

    Ok(Json(json!({ "status": "ok" })))
}

/// "Candidate chose a start time" trigger.
pub async fn schedule_assignment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    state.scheduler.start(id).await?;

    Ok(Json(json!({ "status": "ok" })))
}

/// Candidate cancelled outright; tear down the active schedule.
pub async fn stop_assignment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    state.scheduler.stop(id).await?;

    Ok(Json(json!({ "status": "ok" })))
}

/// Attach a reviewer to an assignment and grant repository access when the
/// repo already exists.
pub async fn add_reviewer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(reviewer): Json<Reviewer>,
) -> ApiResult<impl IntoResponse> {
    state.reviewer_service.add_reviewer(id, reviewer).await?;

    Ok((axum::http::StatusCode::CREATED, Json(json!({ "status": "ok" }))))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
