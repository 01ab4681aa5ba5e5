use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Assignment, Step};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("no pending schedule found for handle {0}")]
    NotFound(String),
    #[error("schedule backend error: {0}")]
    Backend(String),
}

/// Registration request for a future one-shot step callback.
#[derive(Debug, Clone)]
pub struct StartInput {
    pub step: Step,
    pub assignment_id: i64,
    pub schedule_at: DateTime<Utc>,
    /// Remaining assessment duration in seconds, carried for observability.
    pub duration: i64,
    /// Full assignment snapshot at schedule time.
    pub data: Assignment,
}

/// Abstraction over an external one-shot callback service. Implementations
/// must return an opaque handle that later cancels exactly that
/// registration; registrations for different steps of the same assignment
/// are independent.
#[async_trait::async_trait]
pub trait ScheduleGateway: Send + Sync {
    async fn start(&self, input: StartInput) -> Result<String, ScheduleError>;

    /// Cancels a previously registered callback. Stopping a handle that has
    /// already fired or been cancelled returns `NotFound`; callers decide
    /// whether that is fatal.
    async fn stop(&self, handle: &str) -> Result<(), ScheduleError>;
}
