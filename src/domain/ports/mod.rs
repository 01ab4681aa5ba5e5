pub mod assignment_repository;
pub mod clock;
pub mod mailer;
pub mod schedule_gateway;
pub mod vcs;
