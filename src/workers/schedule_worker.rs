use reqwest::Client;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::database::Database;
use crate::models::{ScheduledEvent, ScheduledEventStatus};

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const ERROR_BACKOFF: Duration = Duration::from_secs(5);
const BATCH_SIZE: i64 = 10;
/// Webhook delivery attempts per event before it is marked failed.
const MAX_DELIVERY_ATTEMPTS: i64 = 5;

/// Delivers due one-off events to the step webhook. Only used with the
/// database schedule backend; the HTTP backend's external service performs
/// its own delivery. Delivery is at-least-once: a crash between the POST
/// and the status update re-delivers on restart.
pub struct ScheduleWorker {
    db: Database,
    http_client: Client,
    webhook_url: String,
    access_token: String,
}

impl ScheduleWorker {
    pub fn new(db: Database, webhook_url: String, access_token: String) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            db,
            http_client,
            webhook_url,
            access_token,
        }
    }

    pub async fn run(&self) {
        info!("Starting ScheduleWorker...");
        loop {
            match self.process_due().await {
                Ok(0) => tokio::time::sleep(POLL_INTERVAL).await,
                Ok(n) => {
                    info!(delivered = n, "delivered due schedule events");
                }
                Err(e) => {
                    error!("Error delivering schedule events: {}", e);
                    tokio::time::sleep(ERROR_BACKOFF).await;
                }
            }
        }
    }

    pub async fn process_due(&self) -> Result<usize, String> {
        let due = self
            .db
            .due_scheduled_events(BATCH_SIZE)
            .await
            .map_err(|e| e.to_string())?;

        let mut delivered = 0;
        for event in due {
            match self.deliver(&event).await {
                Ok(()) => {
                    self.db
                        .mark_scheduled_event(&event.id, ScheduledEventStatus::Delivered)
                        .await
                        .map_err(|e| e.to_string())?;
                    delivered += 1;
                }
                Err(e) => {
                    // Transient webhook failures get retried on later polls
                    // until the attempt budget runs out.
                    let status = self
                        .db
                        .record_delivery_failure(&event.id, MAX_DELIVERY_ATTEMPTS)
                        .await
                        .map_err(|e| e.to_string())?;
                    warn!(
                        event_id = %event.id,
                        step = %event.step,
                        status = status.as_str(),
                        error = %e,
                        "step delivery failed"
                    );
                }
            }
        }

        Ok(delivered)
    }

    async fn deliver(&self, event: &ScheduledEvent) -> Result<(), String> {
        let response = self
            .http_client
            .post(&self.webhook_url)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.access_token)
            .body(event.payload.clone())
            .send()
            .await
            .map_err(|e| format!("could not reach webhook: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("webhook returned {}: {}", status, body));
        }

        Ok(())
    }
}
