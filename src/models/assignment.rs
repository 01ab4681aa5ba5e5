use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an assignment. Transitions up to `scheduled` are
/// driven by the surrounding invite flow; the step runner emits the
/// `inprogress` and terminal `submitted`/`missed` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Sending,
    Sent,
    Scheduled,
    Inprogress,
    Submitted,
    Missed,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Sending => "sending",
            AssignmentStatus::Sent => "sent",
            AssignmentStatus::Scheduled => "scheduled",
            AssignmentStatus::Inprogress => "inprogress",
            AssignmentStatus::Submitted => "submitted",
            AssignmentStatus::Missed => "missed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sending" => Some(AssignmentStatus::Sending),
            "sent" => Some(AssignmentStatus::Sent),
            "scheduled" => Some(AssignmentStatus::Scheduled),
            "inprogress" => Some(AssignmentStatus::Inprogress),
            "submitted" => Some(AssignmentStatus::Submitted),
            "missed" => Some(AssignmentStatus::Missed),
            _ => None,
        }
    }
}

/// A named phase in the assignment lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Start,
    Init,
    End,
    Cleanup,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Start => "start",
            Step::Init => "init",
            Step::End => "end",
            Step::Cleanup => "cleanup",
        }
    }

    /// Unknown names resolve to `None`; callers treat that as a no-op so
    /// in-flight schedules carrying newer step names do not fail.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "start" => Some(Step::Start),
            "init" => Some(Step::Init),
            "end" => Some(Step::End),
            "cleanup" => Some(Step::Cleanup),
            _ => None,
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub email: String,
    #[serde(rename = "githubUsername")]
    pub github_username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recruiter {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSpec {
    pub name: String,
    /// HTTPS clone URL of the business template repository.
    #[serde(rename = "githubRepo")]
    pub github_repo: String,
    /// GitHub app installation that owns the template repository.
    #[serde(rename = "installationID", default)]
    pub installation_id: i64,
    pub business: Business,
}

/// Aggregate root of the assessment lifecycle. The full struct travels as
/// the snapshot inside every scheduled step payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: i64,
    pub candidate_id: i64,
    #[serde(default)]
    pub candidate_name: String,
    pub test_day_chosen: Option<String>,
    pub test_time_chosen: Option<String>,
    pub test_timezone_chosen: Option<String>,
    /// Set at most once; every step reuses the existing value.
    #[serde(rename = "githubRepoURL", default)]
    pub github_repo_url: String,
    /// Opaque id of the one active future callback, empty when none.
    #[serde(default)]
    pub schedule_handle: String,
    /// Total assessment duration in seconds.
    pub time_limit: i64,
    pub status: AssignmentStatus,
    pub candidate: Candidate,
    pub recruiter: Recruiter,
    pub test: TestSpec,
}

/// Message carried by each step callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepPayload {
    pub step: String,
    #[serde(rename = "assignmentID", default)]
    pub assignment_id: i64,
    #[serde(rename = "scheduledFireTime", default)]
    pub scheduled_fire_time: Option<DateTime<Utc>>,
    pub data: Assignment,
}

/// Lifecycle event row written when a step transitions the assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentEvent {
    pub id: i64,
    pub assignment_id: i64,
    pub user_id: i64,
    pub event_type: String,
    pub created_at: String,
}

/// A reviewer granted access to the candidate repository at cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reviewer {
    pub email: String,
    #[serde(rename = "githubUsername")]
    pub github_username: String,
}
