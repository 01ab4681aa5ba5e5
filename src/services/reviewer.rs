use std::sync::Arc;
use tracing::info;

use crate::api::middleware::error::ApiResult;
use crate::domain::ports::{
    assignment_repository::AssignmentRepository,
    mailer::{MailConfig, Mailer},
    vcs::{VcsCollaboratorAdder, VcsError},
};
use crate::models::Reviewer;

/// Handles a reviewer being attached to an assignment: repository access
/// plus an invite email.
#[derive(Clone)]
pub struct ReviewerService {
    repo: Arc<dyn AssignmentRepository>,
    collaborator_adder: Arc<dyn VcsCollaboratorAdder>,
    mailer: Arc<dyn Mailer>,
}

impl ReviewerService {
    pub fn new(
        repo: Arc<dyn AssignmentRepository>,
        collaborator_adder: Arc<dyn VcsCollaboratorAdder>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            repo,
            collaborator_adder,
            mailer,
        }
    }

    pub async fn add_reviewer(&self, assignment_id: i64, reviewer: Reviewer) -> ApiResult<()> {
        let assignment = self.repo.get_assignment(assignment_id).await?;

        // The repo may not exist yet when the reviewer is attached before
        // the candidate picks a time; cleanup grants access later.
        if !assignment.github_repo_url.is_empty() && !reviewer.github_username.is_empty() {
            match self
                .collaborator_adder
                .add_collaborator(&assignment.github_repo_url, &reviewer.github_username)
                .await
            {
                Ok(()) => {}
                // Convergent: a re-delivered event or a reviewer who already
                // has access is not an error.
                Err(VcsError::AlreadyCollaborator(user)) => {
                    info!(assignment_id, user = %user, "reviewer already has repo access");
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.repo.add_reviewer(assignment_id, &reviewer).await?;

        self.mailer
            .send(
                MailConfig {
                    template: "reviewer-invite".to_string(),
                    subject: format!(
                        "You have been asked to review {}'s assignment",
                        assignment.candidate_name
                    ),
                    to: reviewer.email.clone(),
                },
                &assignment,
            )
            .await?;

        Ok(())
    }
}
