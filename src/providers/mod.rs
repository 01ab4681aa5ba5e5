pub mod github;
pub mod schedule_db;
pub mod schedule_http;
pub mod smtp_mailer;

pub use github::GithubClient;
pub use schedule_db::DbScheduleGateway;
pub use schedule_http::HttpScheduleGateway;
pub use smtp_mailer::{SmtpConfig, SmtpMailer};
