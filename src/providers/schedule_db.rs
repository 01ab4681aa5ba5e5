use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::database::Database;
use crate::domain::ports::schedule_gateway::{ScheduleError, ScheduleGateway, StartInput};
use crate::models::{ScheduledEvent, ScheduledEventStatus, StepPayload};

/// Schedule gateway backed by a one-off event table in the service
/// database. The delivery worker POSTs due payloads to the step webhook;
/// the row id is the schedule handle.
#[derive(Clone)]
pub struct DbScheduleGateway {
    db: Database,
}

impl DbScheduleGateway {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl ScheduleGateway for DbScheduleGateway {
    async fn start(&self, input: StartInput) -> Result<String, ScheduleError> {
        let id = Uuid::new_v4().to_string();

        let payload = StepPayload {
            step: input.step.as_str().to_string(),
            assignment_id: input.assignment_id,
            scheduled_fire_time: Some(input.schedule_at),
            data: input.data,
        };
        let payload = serde_json::to_string(&payload)
            .map_err(|e| ScheduleError::Backend(format!("could not encode payload: {}", e)))?;

        let event = ScheduledEvent {
            id: id.clone(),
            step: input.step.as_str().to_string(),
            assignment_id: input.assignment_id,
            schedule_at: input
                .schedule_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            payload,
            status: ScheduledEventStatus::Pending,
            attempts: 0,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        self.db
            .insert_scheduled_event(&event)
            .await
            .map_err(|e| ScheduleError::Backend(e.to_string()))?;

        Ok(id)
    }

    async fn stop(&self, handle: &str) -> Result<(), ScheduleError> {
        let cancelled = self
            .db
            .cancel_scheduled_event(handle)
            .await
            .map_err(|e| ScheduleError::Backend(e.to_string()))?;

        if cancelled == 0 {
            return Err(ScheduleError::NotFound(handle.to_string()));
        }

        Ok(())
    }
}
