use thiserror::Error;

use crate::models::Assignment;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to build email message: {0}")]
    MessageBuild(String),
    #[error("failed to send email: {0}")]
    Send(String),
    #[error("unknown mail template {0}")]
    UnknownTemplate(String),
}

/// Named template plus envelope for one outbound lifecycle email.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub template: String,
    pub subject: String,
    pub to: String,
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, config: MailConfig, assignment: &Assignment) -> Result<(), MailError>;
}
