use chrono::{SecondsFormat, Utc};
use sqlx::{any::AnyPoolOptions, AnyPool, Row};

use crate::{
    api::middleware::error::{ApiError, ApiResult},
    models::*,
};

#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = AnyPoolOptions::new()
            .max_connections(20)
            .min_connections(5)
            .connect(database_url)
            .await?;

        // Enable foreign keys for SQLite
        if database_url.starts_with("sqlite") {
            sqlx::query("PRAGMA foreign_keys = ON")
                .execute(&pool)
                .await?;
        }

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("migrations/sqlite").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Used by the upstream invite flow and the test harness; the lifecycle
    /// core itself never creates assignments.
    pub async fn create_assignment(&self, assignment: &Assignment) -> ApiResult<()> {
        let now = rfc3339_now();
        sqlx::query(
            "INSERT INTO assignments (
                id, candidate_id, candidate_name, candidate_email, candidate_github_username,
                recruiter_email, test_day_chosen, test_time_chosen, test_timezone_chosen,
                github_repo_url, schedule_handle, time_limit, status,
                test_name, test_repo, business_name, installation_id,
                created_at, updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(assignment.id)
        .bind(assignment.candidate_id)
        .bind(&assignment.candidate_name)
        .bind(&assignment.candidate.email)
        .bind(&assignment.candidate.github_username)
        .bind(&assignment.recruiter.email)
        .bind(&assignment.test_day_chosen)
        .bind(&assignment.test_time_chosen)
        .bind(&assignment.test_timezone_chosen)
        .bind(&assignment.github_repo_url)
        .bind(&assignment.schedule_handle)
        .bind(assignment.time_limit)
        .bind(assignment.status.as_str())
        .bind(&assignment.test.name)
        .bind(&assignment.test.github_repo)
        .bind(&assignment.test.business.name)
        .bind(assignment.test.installation_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_events(&self, assignment_id: i64) -> ApiResult<Vec<AssignmentEvent>> {
        let rows = sqlx::query(
            "SELECT id, assignment_id, user_id, event_type, created_at
             FROM assignment_events
             WHERE assignment_id = ?
             ORDER BY id",
        )
        .bind(assignment_id)
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            events.push(AssignmentEvent {
                id: row.try_get("id")?,
                assignment_id: row.try_get("assignment_id")?,
                user_id: row.try_get("user_id")?,
                event_type: row.try_get("event_type")?,
                created_at: row.try_get("created_at")?,
            });
        }

        Ok(events)
    }

    // Scheduled event operations, used by the database schedule gateway and
    // the delivery worker.

    pub async fn insert_scheduled_event(&self, event: &ScheduledEvent) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO scheduled_events (id, step, assignment_id, schedule_at, payload, status, attempts, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&event.id)
        .bind(&event.step)
        .bind(event.assignment_id)
        .bind(&event.schedule_at)
        .bind(&event.payload)
        .bind(event.status.as_str())
        .bind(event.attempts)
        .bind(&event.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Cancels a pending event, returning how many rows changed. Zero means
    /// the event already fired, failed or was cancelled.
    pub async fn cancel_scheduled_event(&self, id: &str) -> ApiResult<u64> {
        let result = sqlx::query(
            "UPDATE scheduled_events SET status = 'cancelled' WHERE id = ? AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Pending events whose fire instant has passed, oldest first.
    pub async fn due_scheduled_events(&self, limit: i64) -> ApiResult<Vec<ScheduledEvent>> {
        let now = rfc3339_now();
        let rows = sqlx::query(
            "SELECT id, step, assignment_id, schedule_at, payload, status, attempts, created_at
             FROM scheduled_events
             WHERE status = 'pending' AND schedule_at <= ?
             ORDER BY schedule_at
             LIMIT ?",
        )
        .bind(&now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let status: String = row.try_get("status")?;
            events.push(ScheduledEvent {
                id: row.try_get("id")?,
                step: row.try_get("step")?,
                assignment_id: row.try_get("assignment_id")?,
                schedule_at: row.try_get("schedule_at")?,
                payload: row.try_get("payload")?,
                status: ScheduledEventStatus::parse(&status)
                    .ok_or_else(|| ApiError::Internal(format!("bad event status {}", status)))?,
                attempts: row.try_get("attempts")?,
                created_at: row.try_get("created_at")?,
            });
        }

        Ok(events)
    }

    /// Counts a failed delivery attempt. The event stays pending (and so
    /// gets retried on a later poll) until `max_attempts` is spent, then
    /// flips to failed. Returns the resulting status.
    pub async fn record_delivery_failure(
        &self,
        id: &str,
        max_attempts: i64,
    ) -> ApiResult<ScheduledEventStatus> {
        sqlx::query(
            "UPDATE scheduled_events
             SET attempts = attempts + 1,
                 status = CASE WHEN attempts + 1 >= ? THEN 'failed' ELSE status END
             WHERE id = ? AND status = 'pending'",
        )
        .bind(max_attempts)
        .bind(id)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT status FROM scheduled_events WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("scheduled event {}", id)))?;

        let status: String = row.try_get("status")?;
        ScheduledEventStatus::parse(&status)
            .ok_or_else(|| ApiError::Internal(format!("bad event status {}", status)))
    }

    pub async fn mark_scheduled_event(
        &self,
        id: &str,
        status: ScheduledEventStatus,
    ) -> ApiResult<()> {
        sqlx::query("UPDATE scheduled_events SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl crate::domain::ports::assignment_repository::AssignmentRepository for Database {
    async fn get_assignment(&self, id: i64) -> ApiResult<Assignment> {
        let row = sqlx::query(
            "SELECT id, candidate_id, candidate_name, candidate_email, candidate_github_username,
                    recruiter_email, test_day_chosen, test_time_chosen, test_timezone_chosen,
                    github_repo_url, schedule_handle, time_limit, status,
                    test_name, test_repo, business_name, installation_id
             FROM assignments
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("assignment {}", id)))?;

        let status: String = row.try_get("status")?;
        Ok(Assignment {
            id: row.try_get("id")?,
            candidate_id: row.try_get("candidate_id")?,
            candidate_name: row.try_get("candidate_name")?,
            test_day_chosen: row.try_get("test_day_chosen").ok(),
            test_time_chosen: row.try_get("test_time_chosen").ok(),
            test_timezone_chosen: row.try_get("test_timezone_chosen").ok(),
            github_repo_url: row.try_get("github_repo_url")?,
            schedule_handle: row.try_get("schedule_handle")?,
            time_limit: row.try_get("time_limit")?,
            status: AssignmentStatus::parse(&status)
                .ok_or_else(|| ApiError::Internal(format!("bad assignment status {}", status)))?,
            candidate: Candidate {
                email: row.try_get("candidate_email")?,
                github_username: row.try_get("candidate_github_username")?,
            },
            recruiter: Recruiter {
                email: row.try_get("recruiter_email")?,
            },
            test: TestSpec {
                name: row.try_get("test_name")?,
                github_repo: row.try_get("test_repo")?,
                installation_id: row.try_get("installation_id")?,
                business: Business {
                    name: row.try_get("business_name")?,
                },
            },
        })
    }

    async fn update_schedule_details(
        &self,
        id: i64,
        previous_handle: &str,
        handle: &str,
        repo_url: &str,
    ) -> ApiResult<()> {
        let result = sqlx::query(
            "UPDATE assignments
             SET schedule_handle = ?, github_repo_url = ?, status = 'scheduled', updated_at = ?
             WHERE id = ? AND schedule_handle = ?",
        )
        .bind(handle)
        .bind(repo_url)
        .bind(rfc3339_now())
        .bind(id)
        .bind(previous_handle)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::Conflict(format!(
                "assignment {} was rescheduled concurrently",
                id
            )));
        }

        Ok(())
    }

    async fn insert_event(
        &self,
        assignment_id: i64,
        user_id: i64,
        event_type: &str,
    ) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO assignment_events (assignment_id, user_id, event_type, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(assignment_id)
        .bind(user_id)
        .bind(event_type)
        .bind(rfc3339_now())
        .execute(&self.pool)
        .await?;

        // Event types double as the assignment's lifecycle status.
        if AssignmentStatus::parse(event_type).is_some() {
            sqlx::query("UPDATE assignments SET status = ?, updated_at = ? WHERE id = ?")
                .bind(event_type)
                .bind(rfc3339_now())
                .bind(assignment_id)
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    async fn reviewers(&self, assignment_id: i64) -> ApiResult<Vec<Reviewer>> {
        let rows = sqlx::query(
            "SELECT email, github_username FROM assignment_reviewers WHERE assignment_id = ?",
        )
        .bind(assignment_id)
        .fetch_all(&self.pool)
        .await?;

        let mut reviewers = Vec::with_capacity(rows.len());
        for row in rows {
            reviewers.push(Reviewer {
                email: row.try_get("email")?,
                github_username: row.try_get("github_username")?,
            });
        }

        Ok(reviewers)
    }

    async fn add_reviewer(&self, assignment_id: i64, reviewer: &Reviewer) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO assignment_reviewers (assignment_id, email, github_username, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(assignment_id)
        .bind(&reviewer.email)
        .bind(&reviewer.github_username)
        .bind(rfc3339_now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn rfc3339_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
