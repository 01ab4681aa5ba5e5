use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    /// The user already has access or a pending invitation. Invite flows
    /// treat this as success.
    #[error("{0} is already a collaborator")]
    AlreadyCollaborator(String),
    #[error("github api error: {0}")]
    Api(String),
    #[error("io error during repository upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("{command} exited with {status}: {stderr}")]
    Process {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Everything the upload step needs to copy the template into the
/// candidate repository.
#[derive(Debug, Clone)]
pub struct UploadDetails {
    pub assignment_id: i64,
    /// Candidate repository HTTPS clone URL.
    pub repo_url: String,
    /// Business template repository HTTPS clone URL.
    pub test_repo_url: String,
    /// GitHub app installation that can read the template repository.
    pub installation_id: i64,
}

#[derive(Debug, Clone)]
pub struct CleanDetails {
    pub assignment_id: i64,
    pub repo_url: String,
    pub candidate_username: String,
    pub reviewer_usernames: Vec<String>,
}

#[async_trait::async_trait]
pub trait VcsCreator: Send + Sync {
    /// Creates a private repository named deterministically from the inputs
    /// and grants the candidate access. Does not check for pre-existing
    /// repos; callers only invoke this when the assignment has no repo URL.
    async fn create_repo(
        &self,
        business_name: &str,
        username: &str,
        assignment_id: i64,
    ) -> Result<String, VcsError>;
}

#[async_trait::async_trait]
pub trait VcsCollaboratorAdder: Send + Sync {
    async fn add_collaborator(&self, repo_url: &str, username: &str) -> Result<(), VcsError>;
}

#[async_trait::async_trait]
pub trait VcsUploader: Send + Sync {
    /// Copies the template repository into the candidate repository as a
    /// single commit, force-pushing over whatever is there.
    async fn upload(&self, details: UploadDetails) -> Result<(), VcsError>;
}

#[async_trait::async_trait]
pub trait VcsCleaner: Send + Sync {
    /// Revokes candidate access (including pending invitations) and grants
    /// each reviewer access.
    async fn cleanup(&self, details: CleanDetails) -> Result<(), VcsError>;
}

#[async_trait::async_trait]
pub trait VcsSubmissionChecker: Send + Sync {
    /// True iff a pull request authored by `username` exists on the repo.
    async fn is_submitted(&self, repo_url: &str, username: &str) -> Result<bool, VcsError>;
}
