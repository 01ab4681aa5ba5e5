use std::sync::Arc;
use tracing::info;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::domain::ports::{
    assignment_repository::AssignmentRepository,
    schedule_gateway::{ScheduleGateway, StartInput},
    vcs::VcsCreator,
};
use crate::models::Step;
use crate::services::time_resolver::{self, AssignmentChoices};

/// Seconds carved off the assessment window to cover the reminder lead and
/// the end-of-window warning.
const DURATION_RESERVE: i64 = 600;

/// Orchestrates "candidate chose a start time": cancels any prior schedule,
/// resolves absolute fire times, provisions the candidate repository when
/// absent and arms the `start` step.
#[derive(Clone)]
pub struct AssignmentScheduler {
    repo: Arc<dyn AssignmentRepository>,
    gateway: Arc<dyn ScheduleGateway>,
    creator: Arc<dyn VcsCreator>,
}

impl AssignmentScheduler {
    pub fn new(
        repo: Arc<dyn AssignmentRepository>,
        gateway: Arc<dyn ScheduleGateway>,
        creator: Arc<dyn VcsCreator>,
    ) -> Self {
        Self {
            repo,
            gateway,
            creator,
        }
    }

    pub async fn start(&self, assignment_id: i64) -> ApiResult<()> {
        let mut assignment = self.repo.get_assignment(assignment_id).await?;
        let previous_handle = assignment.schedule_handle.clone();

        // At most one active callback per assignment. A stop failure here is
        // fatal: continuing would leave two competing timers.
        if !previous_handle.is_empty() {
            self.gateway.stop(&previous_handle).await.map_err(|e| {
                ApiError::Internal(format!(
                    "could not stop previously scheduled assignment {}: {}",
                    assignment_id, e
                ))
            })?;
        }

        let choices = AssignmentChoices {
            day_chosen: assignment.test_day_chosen.clone().unwrap_or_default(),
            time_chosen: assignment.test_time_chosen.clone().unwrap_or_default(),
            timezone: assignment.test_timezone_chosen.clone().unwrap_or_default(),
        };
        let schedule = time_resolver::resolve(&choices)?;

        // Never regenerate a repo URL once one exists.
        if assignment.github_repo_url.is_empty() {
            assignment.github_repo_url = self
                .creator
                .create_repo(
                    &assignment.test.business.name,
                    &assignment.candidate.github_username,
                    assignment.id,
                )
                .await?;
        }

        let handle = self
            .gateway
            .start(StartInput {
                step: Step::Start,
                assignment_id: assignment.id,
                schedule_at: schedule.send_notification_at,
                duration: assignment.time_limit - DURATION_RESERVE,
                data: assignment.clone(),
            })
            .await?;

        // Persisted last; earlier side effects are not rolled back when this
        // fails. The guard on the previous handle makes a racing reschedule
        // lose cleanly instead of leaving both timers registered.
        self.repo
            .update_schedule_details(
                assignment.id,
                &previous_handle,
                &handle,
                &assignment.github_repo_url,
            )
            .await?;

        info!(
            assignment_id = assignment.id,
            handle = %handle,
            schedule_at = %schedule.send_notification_at,
            "assignment scheduled"
        );
        Ok(())
    }

    /// Cancels the active schedule when a candidate withdraws rather than
    /// reschedules.
    pub async fn stop(&self, assignment_id: i64) -> ApiResult<()> {
        let assignment = self.repo.get_assignment(assignment_id).await?;

        self.gateway
            .stop(&assignment.schedule_handle)
            .await
            .map_err(|e| {
                ApiError::Internal(format!(
                    "could not stop previously scheduled assignment {}: {}",
                    assignment_id, e
                ))
            })?;

        Ok(())
    }
}
