use chrono::Duration;
use std::sync::Arc;

use crate::api::AppState;
use crate::config::{Config, SchedulerBackend};
use crate::database::Database;
use crate::domain::ports::{
    assignment_repository::AssignmentRepository, clock::SystemClock, mailer::Mailer,
    schedule_gateway::ScheduleGateway,
};
use crate::providers::{
    DbScheduleGateway, GithubClient, HttpScheduleGateway, SmtpConfig, SmtpMailer,
};
use crate::services::{AssignmentScheduler, ReviewerService, StepRunner};
use crate::workers::ScheduleWorker;

/// Wires all external clients and services explicitly; nothing here is a
/// process-level singleton.
pub async fn build_app_state(
    db: Database,
    config: &Config,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let repo: Arc<dyn AssignmentRepository> = Arc::new(db.clone());

    let github = Arc::new(GithubClient::new(
        config.github_token.clone(),
        config.github_installation_token.clone(),
    )?);
    tracing::info!("GitHub client initialized");

    let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(&SmtpConfig {
        host: config.smtp_host.clone(),
        port: config.smtp_port,
        username: config.smtp_username.clone(),
        password: config.smtp_password.clone(),
        from_email: config.smtp_from_email.clone(),
        from_name: config.smtp_from_name.clone(),
    })?);
    tracing::info!("SMTP mailer initialized");

    let gateway: Arc<dyn ScheduleGateway> = match config.scheduler_backend {
        SchedulerBackend::Db => {
            // The table-backed gateway needs its own delivery loop.
            let worker = ScheduleWorker::new(
                db.clone(),
                config.webhook_url.clone(),
                config.access_token.clone(),
            );
            tokio::spawn(async move { worker.run().await });
            tracing::info!("Schedule worker started (db backend)");

            Arc::new(DbScheduleGateway::new(db.clone()))
        }
        SchedulerBackend::Http => Arc::new(HttpScheduleGateway::new(
            config.scheduler_url.clone(),
            config.scheduler_admin_secret.clone(),
            config.webhook_url.clone(),
            config.access_token.clone(),
        )?),
    };
    tracing::info!("Schedule gateway initialized");

    let scheduler = AssignmentScheduler::new(repo.clone(), gateway.clone(), github.clone());

    let step_runner = StepRunner::new(
        repo.clone(),
        gateway,
        github.clone(),
        github.clone(),
        github.clone(),
        mailer.clone(),
        Arc::new(SystemClock),
        Duration::seconds(config.start_delay_secs),
        Duration::seconds(config.warning_before_end_secs),
    );

    let reviewer_service = ReviewerService::new(repo, github, mailer);

    Ok(AppState {
        access_token: config.access_token.clone(),
        scheduler,
        step_runner,
        reviewer_service,
    })
}
