use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::domain::ports::mailer::{MailConfig, MailError, Mailer};
use crate::models::Assignment;

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

/// Lifecycle email sender backed by SMTP. Bodies are plain-text templates
/// selected by name; subjects are chosen by the caller.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailError::Send(format!("SMTP relay config error: {}", e)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: format!("{} <{}>", config.from_name, config.from_email),
        })
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, config: MailConfig, assignment: &Assignment) -> Result<(), MailError> {
        let body = template_body(&config.template, assignment)?;

        let email = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| MailError::MessageBuild(format!("invalid from address: {}", e)))?,
            )
            .to(config
                .to
                .parse()
                .map_err(|e| MailError::MessageBuild(format!("invalid to address: {}", e)))?)
            .subject(&config.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| MailError::MessageBuild(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;

        Ok(())
    }
}

/// Plain-text body for each lifecycle template.
pub fn template_body(template: &str, assignment: &Assignment) -> Result<String, MailError> {
    let business = &assignment.test.business.name;
    let body = match template {
        "warning" => format!(
            "Hi {name},\n\n\
             Your {business} assignment starts in 5 minutes.\n\
             The test repository will be shared with your GitHub account ({username}) \
             as soon as the test begins.\n\n\
             Good luck!",
            name = assignment.candidate_name,
            business = business,
            username = assignment.candidate.github_username,
        ),
        "end" => format!(
            "Hi {name},\n\n\
             Your {business} assignment window is about to close.\n\
             Open a pull request on {repo} to submit your work before the deadline.",
            name = assignment.candidate_name,
            business = business,
            repo = assignment.github_repo_url,
        ),
        "submitted" => format!(
            "Hi {name},\n\n\
             Thanks for submitting your test for {business}.\n\
             The team will review your work and be in touch.",
            name = assignment.candidate_name,
            business = business,
        ),
        "missed" => format!(
            "Hi {name},\n\n\
             The deadline for your {business} assignment has passed and no \
             submission was found. Your access to the test repository has been removed.",
            name = assignment.candidate_name,
            business = business,
        ),
        "submitted-recruiter" => format!(
            "{name} has submitted their assignment for {business}.\n\
             The repository is ready for review: {repo}",
            name = assignment.candidate_name,
            business = business,
            repo = assignment.github_repo_url,
        ),
        "missed-recruiter" => format!(
            "{name} missed the deadline to submit their assignment for {business}.\n\
             Repository: {repo}",
            name = assignment.candidate_name,
            business = business,
            repo = assignment.github_repo_url,
        ),
        "reviewer-invite" => format!(
            "You have been asked to review {name}'s assignment for {business}.\n\
             You will receive repository access once the assessment finishes.",
            name = assignment.candidate_name,
            business = business,
        ),
        other => return Err(MailError::UnknownTemplate(other.to_string())),
    };

    Ok(body)
}
