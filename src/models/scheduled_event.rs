use serde::{Deserialize, Serialize};

/// One-off event row backing the database schedule gateway. `id` doubles as
/// the opaque schedule handle returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub id: String,
    pub step: String,
    pub assignment_id: i64,
    /// RFC3339 UTC instant at which the payload should be delivered.
    pub schedule_at: String,
    /// Serialized `StepPayload` delivered verbatim to the step webhook.
    pub payload: String,
    pub status: ScheduledEventStatus,
    /// Failed delivery attempts so far; the event only goes `failed` once
    /// the worker's attempt budget is spent.
    pub attempts: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduledEventStatus {
    Pending,
    Delivered,
    Cancelled,
    Failed,
}

impl ScheduledEventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduledEventStatus::Pending => "pending",
            ScheduledEventStatus::Delivered => "delivered",
            ScheduledEventStatus::Cancelled => "cancelled",
            ScheduledEventStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ScheduledEventStatus::Pending),
            "delivered" => Some(ScheduledEventStatus::Delivered),
            "cancelled" => Some(ScheduledEventStatus::Cancelled),
            "failed" => Some(ScheduledEventStatus::Failed),
            _ => None,
        }
    }
}
