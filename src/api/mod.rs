pub mod assignments;
pub mod middleware;

pub use middleware::*;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::services::{AssignmentScheduler, ReviewerService, StepRunner};

#[derive(Clone)]
pub struct AppState {
    pub access_token: String,
    pub scheduler: AssignmentScheduler,
    pub step_runner: StepRunner,
    pub reviewer_service: ReviewerService,
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/assignments/process", post(assignments::process_step))
        .route(
            "/assignments/:id/schedule",
            post(assignments::schedule_assignment),
        )
        .route("/assignments/:id/stop", post(assignments::stop_assignment))
        .route(
            "/assignments/:id/reviewers",
            post(assignments::add_reviewer),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::require_access_token,
        ));

    Router::new()
        .route("/health", get(assignments::health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
