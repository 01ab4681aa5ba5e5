use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerBackend {
    /// One-off event table in the service database plus the delivery worker.
    Db,
    /// External one-shot scheduling service reached over HTTP.
    Http,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Shared token the scheduler presents on step callbacks.
    pub access_token: String,
    pub scheduler_backend: SchedulerBackend,
    pub scheduler_url: String,
    pub scheduler_admin_secret: String,
    /// Where step callbacks are delivered.
    pub webhook_url: String,
    pub github_token: String,
    pub github_installation_token: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from_email: String,
    pub smtp_from_name: String,
    /// Seconds between the reminder email and the assessment start.
    pub start_delay_secs: i64,
    /// Seconds before the window closes that the warning email goes out.
    pub warning_before_end_secs: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://hirerelay.db?mode=rwc".to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let access_token = env::var("ACCESS_TOKEN").map_err(|_| ConfigError::MissingAccessToken)?;

        let scheduler_backend = match env::var("SCHEDULER_BACKEND")
            .unwrap_or_else(|_| "db".to_string())
            .as_str()
        {
            "db" => SchedulerBackend::Db,
            "http" => SchedulerBackend::Http,
            other => return Err(ConfigError::UnknownSchedulerBackend(other.to_string())),
        };

        let scheduler_url = env::var("SCHEDULER_URL").unwrap_or_default();
        let scheduler_admin_secret = env::var("SCHEDULER_ADMIN_SECRET").unwrap_or_default();
        if scheduler_backend == SchedulerBackend::Http && scheduler_url.is_empty() {
            return Err(ConfigError::MissingSchedulerUrl);
        }

        let webhook_url = env::var("WEBHOOK_URL")
            .unwrap_or_else(|_| format!("http://{}:{}/assignments/process", server_host, server_port));

        let github_token =
            env::var("GITHUB_ACCESS_TOKEN").map_err(|_| ConfigError::MissingGithubToken)?;
        let github_installation_token =
            env::var("GITHUB_INSTALLATION_TOKEN").unwrap_or_else(|_| github_token.clone());

        let smtp_host = env::var("SMTP_HOST").map_err(|_| ConfigError::MissingSmtpHost)?;
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;
        let smtp_username = env::var("SMTP_USERNAME").unwrap_or_default();
        let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_default();
        let smtp_from_email =
            env::var("SMTP_FROM_EMAIL").unwrap_or_else(|_| "candidates@hirerelay.io".to_string());
        let smtp_from_name = env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Hirerelay".to_string());

        let start_delay_secs = env::var("START_DELAY_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .unwrap_or(300);

        let warning_before_end_secs = env::var("WARNING_BEFORE_END_SECS")
            .unwrap_or_else(|_| "600".to_string())
            .parse()
            .unwrap_or(600);

        Ok(Config {
            database_url,
            server_host,
            server_port,
            access_token,
            scheduler_backend,
            scheduler_url,
            scheduler_admin_secret,
            webhook_url,
            github_token,
            github_installation_token,
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            smtp_from_email,
            smtp_from_name,
            start_delay_secs,
            warning_before_end_secs,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ACCESS_TOKEN environment variable not set")]
    MissingAccessToken,

    #[error("GITHUB_ACCESS_TOKEN environment variable not set")]
    MissingGithubToken,

    #[error("SMTP_HOST environment variable not set")]
    MissingSmtpHost,

    #[error("SCHEDULER_URL required when SCHEDULER_BACKEND=http")]
    MissingSchedulerUrl,

    #[error("Unknown SCHEDULER_BACKEND {0}, expected db or http")]
    UnknownSchedulerBackend(String),

    #[error("Invalid port number")]
    InvalidPort,
}
