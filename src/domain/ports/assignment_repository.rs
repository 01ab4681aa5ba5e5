use crate::api::middleware::error::ApiResult;
use crate::models::{Assignment, Reviewer};

#[async_trait::async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn get_assignment(&self, id: i64) -> ApiResult<Assignment>;

    /// Persists the new schedule handle and repo URL. `previous_handle` is
    /// the handle the caller observed when it fetched the assignment; the
    /// update only applies if the stored handle still matches, so a
    /// concurrent reschedule cannot leave two live timers.
    async fn update_schedule_details(
        &self,
        id: i64,
        previous_handle: &str,
        handle: &str,
        repo_url: &str,
    ) -> ApiResult<()>;

    /// Appends a lifecycle event row and moves the assignment status.
    async fn insert_event(
        &self,
        assignment_id: i64,
        user_id: i64,
        event_type: &str,
    ) -> ApiResult<()>;

    async fn reviewers(&self, assignment_id: i64) -> ApiResult<Vec<Reviewer>>;

    async fn add_reviewer(&self, assignment_id: i64, reviewer: &Reviewer) -> ApiResult<()>;
}
