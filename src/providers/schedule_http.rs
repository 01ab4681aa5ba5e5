use chrono::SecondsFormat;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::ports::schedule_gateway::{ScheduleError, ScheduleGateway, StartInput};
use crate::models::StepPayload;

/// Schedule gateway backed by an external one-shot scheduling service. The
/// service registers a webhook invocation at `schedule_at` and returns an
/// opaque event id which becomes the schedule handle.
pub struct HttpScheduleGateway {
    client: Client,
    base_url: String,
    admin_secret: String,
    /// Target the scheduler calls back at fire time.
    webhook_url: String,
    /// Bearer token the scheduler attaches to the callback request.
    access_token: String,
}

impl HttpScheduleGateway {
    pub fn new(
        base_url: String,
        admin_secret: String,
        webhook_url: String,
        access_token: String,
    ) -> Result<Self, ScheduleError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ScheduleError::Backend(format!("could not build http client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            admin_secret,
            webhook_url,
            access_token,
        })
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        body: &impl Serialize,
    ) -> Result<T, ScheduleError> {
        let url = format!("{}/v1/metadata", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-admin-secret", &self.admin_secret)
            .json(body)
            .send()
            .await
            .map_err(|e| ScheduleError::Backend(format!("could not reach {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ScheduleError::NotFound(body));
            }
            return Err(ScheduleError::Backend(format!(
                "non 2xx status from scheduler, code: {} body: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ScheduleError::Backend(format!("could not decode response: {}", e)))
    }
}

#[async_trait::async_trait]
impl ScheduleGateway for HttpScheduleGateway {
    async fn start(&self, input: StartInput) -> Result<String, ScheduleError> {
        let payload = StepPayload {
            step: input.step.as_str().to_string(),
            assignment_id: input.assignment_id,
            scheduled_fire_time: Some(input.schedule_at),
            data: input.data,
        };

        let request = MetadataRequest {
            r#type: "create_scheduled_event",
            args: CreateEventArgs {
                webhook: self.webhook_url.clone(),
                schedule_at: input
                    .schedule_at
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
                payload,
                headers: vec![Header {
                    name: "Authorization",
                    value: format!("Bearer {}", self.access_token),
                }],
            },
        };

        let response: CreateEventResponse = self.post(&request).await?;
        Ok(response.event_id)
    }

    async fn stop(&self, handle: &str) -> Result<(), ScheduleError> {
        let request = MetadataRequest {
            r#type: "delete_scheduled_event",
            args: DeleteEventArgs {
                r#type: "one_off",
                event_id: handle.to_string(),
            },
        };

        let _: serde_json::Value = self.post(&request).await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct MetadataRequest<A: Serialize> {
    r#type: &'static str,
    args: A,
}

#[derive(Serialize)]
struct CreateEventArgs {
    webhook: String,
    schedule_at: String,
    payload: StepPayload,
    headers: Vec<Header>,
}

#[derive(Serialize)]
struct Header {
    name: &'static str,
    value: String,
}

#[derive(Serialize)]
struct DeleteEventArgs {
    r#type: &'static str,
    event_id: String,
}

#[derive(Deserialize)]
struct CreateEventResponse {
    event_id: String,
}
