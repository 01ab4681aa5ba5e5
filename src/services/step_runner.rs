use chrono::Duration;
use std::sync::Arc;
use tracing::info;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::domain::ports::{
    assignment_repository::AssignmentRepository,
    clock::Clock,
    mailer::{MailConfig, Mailer},
    schedule_gateway::{ScheduleGateway, StartInput},
    vcs::{CleanDetails, UploadDetails, VcsCleaner, VcsSubmissionChecker, VcsUploader},
};
use crate::models::{Assignment, Step, StepPayload};

/// Executes one lifecycle step per callback. Every non-terminal step
/// registers exactly one follow-up schedule; `cleanup` registers none.
/// Effects completed before a failure are not compensated.
#[derive(Clone)]
pub struct StepRunner {
    repo: Arc<dyn AssignmentRepository>,
    gateway: Arc<dyn ScheduleGateway>,
    uploader: Arc<dyn VcsUploader>,
    cleaner: Arc<dyn VcsCleaner>,
    submission_checker: Arc<dyn VcsSubmissionChecker>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    /// Gap between the reminder firing and the assessment start.
    start_delay: Duration,
    /// How long before the window closes the warning email goes out.
    warning_before_end: Duration,
}

impl StepRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repo: Arc<dyn AssignmentRepository>,
        gateway: Arc<dyn ScheduleGateway>,
        uploader: Arc<dyn VcsUploader>,
        cleaner: Arc<dyn VcsCleaner>,
        submission_checker: Arc<dyn VcsSubmissionChecker>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
        start_delay: Duration,
        warning_before_end: Duration,
    ) -> Self {
        Self {
            repo,
            gateway,
            uploader,
            cleaner,
            submission_checker,
            mailer,
            clock,
            start_delay,
            warning_before_end,
        }
    }

    pub async fn run(&self, payload: StepPayload) -> ApiResult<()> {
        let assignment = payload.data;

        match Step::parse(&payload.step) {
            Some(Step::Start) => self.start(assignment).await,
            Some(Step::Init) => self.init(assignment).await,
            Some(Step::End) => self.end(assignment).await,
            Some(Step::Cleanup) => self.cleanup(assignment).await,
            None => {
                // Tolerate payloads from newer deployments instead of
                // failing schedules already in flight.
                info!(step = %payload.step, "assignment step does not exist");
                Ok(())
            }
        }
    }

    async fn start(&self, assignment: Assignment) -> ApiResult<()> {
        self.mailer
            .send(
                MailConfig {
                    template: "warning".to_string(),
                    subject: format!(
                        "5 minute reminder for your {} assignment",
                        assignment.test.business.name
                    ),
                    to: assignment.candidate.email.clone(),
                },
                &assignment,
            )
            .await
            .map_err(|e| {
                ApiError::Internal(format!(
                    "could not send reminder email to candidate {}: {}",
                    assignment.candidate.email, e
                ))
            })?;

        self.schedule_next(Step::Init, self.start_delay, assignment)
            .await
    }

    async fn init(&self, assignment: Assignment) -> ApiResult<()> {
        self.uploader
            .upload(UploadDetails {
                assignment_id: assignment.id,
                repo_url: assignment.github_repo_url.clone(),
                test_repo_url: assignment.test.github_repo.clone(),
                installation_id: assignment.test.installation_id,
            })
            .await
            .map_err(|e| {
                ApiError::Internal(format!("could not upload assignment to github: {}", e))
            })?;

        self.repo
            .insert_event(assignment.id, assignment.candidate_id, "inprogress")
            .await?;

        let offset = Duration::seconds(assignment.time_limit) - self.warning_before_end;
        self.schedule_next(Step::End, offset, assignment).await
    }

    async fn end(&self, assignment: Assignment) -> ApiResult<()> {
        self.mailer
            .send(
                MailConfig {
                    template: "end".to_string(),
                    subject: "Your test is about to finish".to_string(),
                    to: assignment.candidate.email.clone(),
                },
                &assignment,
            )
            .await
            .map_err(|e| {
                ApiError::Internal(format!(
                    "could not send finish email to candidate {}: {}",
                    assignment.candidate.email, e
                ))
            })?;

        self.schedule_next(Step::Cleanup, self.warning_before_end, assignment)
            .await
    }

    async fn cleanup(&self, assignment: Assignment) -> ApiResult<()> {
        let reviewers = self.repo.reviewers(assignment.id).await?;

        self.cleaner
            .cleanup(CleanDetails {
                assignment_id: assignment.id,
                repo_url: assignment.github_repo_url.clone(),
                candidate_username: assignment.candidate.github_username.clone(),
                reviewer_usernames: reviewers
                    .into_iter()
                    .map(|r| r.github_username)
                    .collect(),
            })
            .await
            .map_err(|e| {
                ApiError::Internal(format!(
                    "could not cleanup github repo for assignment {}: {}",
                    assignment.id, e
                ))
            })?;

        let submitted = self
            .submission_checker
            .is_submitted(
                &assignment.github_repo_url,
                &assignment.candidate.github_username,
            )
            .await
            .map_err(|e| {
                ApiError::Internal(format!(
                    "could not check github repo is submitted for assignment {}: {}",
                    assignment.id, e
                ))
            })?;

        let status = if submitted { "submitted" } else { "missed" };
        self.repo
            .insert_event(assignment.id, assignment.candidate_id, status)
            .await?;

        self.send_outcome(status, &assignment).await
    }

    /// Registers the follow-up step relative to the current wall clock. No
    /// compensation runs when this fails: effects already performed in this
    /// invocation stand, and the chain simply stops.
    async fn schedule_next(
        &self,
        step: Step,
        offset: Duration,
        assignment: Assignment,
    ) -> ApiResult<()> {
        let schedule_at = self.clock.now() + offset;
        let assignment_id = assignment.id;
        let time_limit = assignment.time_limit;

        self.gateway
            .start(StartInput {
                step,
                assignment_id,
                schedule_at,
                duration: time_limit,
                data: assignment,
            })
            .await
            .map_err(|e| {
                ApiError::Internal(format!(
                    "could not schedule assignment {} to {}: {}",
                    assignment_id, step, e
                ))
            })?;

        info!(assignment_id, step = %step, schedule_at = %schedule_at, "next step scheduled");
        Ok(())
    }

    async fn send_outcome(&self, status: &str, assignment: &Assignment) -> ApiResult<()> {
        let subject = if status == "submitted" {
            format!(
                "Thanks for submitting your test for {}",
                assignment.test.business.name
            )
        } else {
            "You missed the deadline for submitting your test".to_string()
        };

        self.mailer
            .send(
                MailConfig {
                    template: status.to_string(),
                    subject,
                    to: assignment.candidate.email.clone(),
                },
                assignment,
            )
            .await
            .map_err(|e| {
                ApiError::Internal(format!("could not send email to candidate: {}", e))
            })?;

        let subject = if status == "submitted" {
            format!("{} has submitted their assignment", assignment.candidate_name)
        } else {
            format!(
                "{} missed the deadline to submit their assignment",
                assignment.candidate_name
            )
        };

        self.mailer
            .send(
                MailConfig {
                    template: format!("{}-recruiter", status),
                    subject,
                    to: assignment.recruiter.email.clone(),
                },
                assignment,
            )
            .await
            .map_err(|e| {
                ApiError::Internal(format!("could not send email to recruiter: {}", e))
            })?;

        Ok(())
    }
}
