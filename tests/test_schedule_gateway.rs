mod helpers;

use chrono::{Duration, Utc};
use helpers::*;
use hirerelay::domain::ports::schedule_gateway::{ScheduleError, ScheduleGateway, StartInput};
use hirerelay::models::{ScheduledEventStatus, Step, StepPayload};
use hirerelay::providers::DbScheduleGateway;

fn input(step: Step, schedule_at: chrono::DateTime<Utc>) -> StartInput {
    let assignment = test_assignment(42);
    StartInput {
        step,
        assignment_id: assignment.id,
        schedule_at,
        duration: assignment.time_limit - 600,
        data: assignment,
    }
}

#[tokio::test]
async fn test_start_inserts_pending_event_with_payload() {
    let db = setup_test_db().await;
    let gateway = DbScheduleGateway::new(db.clone());

    let fire_at = Utc::now() + Duration::hours(1);
    let handle = gateway
        .start(input(Step::Start, fire_at))
        .await
        .expect("Failed to register schedule");
    assert!(!handle.is_empty());

    // Nothing due yet for a future fire time
    let due = db.due_scheduled_events(10).await.unwrap();
    assert!(due.is_empty());
}

#[tokio::test]
async fn test_due_events_carry_the_registered_snapshot() {
    let db = setup_test_db().await;
    let gateway = DbScheduleGateway::new(db.clone());

    let fire_at = Utc::now() - Duration::seconds(5);
    let handle = gateway
        .start(input(Step::Init, fire_at))
        .await
        .expect("Failed to register schedule");

    let due = db.due_scheduled_events(10).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, handle);
    assert_eq!(due[0].step, "init");
    assert_eq!(due[0].status, ScheduledEventStatus::Pending);

    let payload: StepPayload = serde_json::from_str(&due[0].payload).unwrap();
    assert_eq!(payload.step, "init");
    assert_eq!(payload.assignment_id, 42);
    assert_eq!(payload.scheduled_fire_time, Some(fire_at));
    assert_eq!(payload.data.candidate.github_username, "alice");
}

#[tokio::test]
async fn test_stop_cancels_pending_event() {
    let db = setup_test_db().await;
    let gateway = DbScheduleGateway::new(db.clone());

    let fire_at = Utc::now() - Duration::seconds(5);
    let handle = gateway.start(input(Step::Start, fire_at)).await.unwrap();

    gateway.stop(&handle).await.expect("Failed to cancel");

    // Cancelled events are never delivered
    assert!(db.due_scheduled_events(10).await.unwrap().is_empty());

    // The handle is spent; a second stop races a fired or cancelled event
    let result = gateway.stop(&handle).await;
    assert!(matches!(result, Err(ScheduleError::NotFound(_))));
}

#[tokio::test]
async fn test_stop_after_delivery_is_not_found() {
    let db = setup_test_db().await;
    let gateway = DbScheduleGateway::new(db.clone());

    let fire_at = Utc::now() - Duration::seconds(5);
    let handle = gateway.start(input(Step::Start, fire_at)).await.unwrap();

    db.mark_scheduled_event(&handle, ScheduledEventStatus::Delivered)
        .await
        .unwrap();

    let result = gateway.stop(&handle).await;
    assert!(matches!(result, Err(ScheduleError::NotFound(_))));
}

#[tokio::test]
async fn test_due_events_come_back_oldest_first() {
    let db = setup_test_db().await;
    let gateway = DbScheduleGateway::new(db.clone());

    let later = gateway
        .start(input(Step::End, Utc::now() - Duration::seconds(10)))
        .await
        .unwrap();
    let earlier = gateway
        .start(input(Step::Start, Utc::now() - Duration::seconds(60)))
        .await
        .unwrap();

    let due = db.due_scheduled_events(10).await.unwrap();
    assert_eq!(due.len(), 2);
    assert_eq!(due[0].id, earlier);
    assert_eq!(due[1].id, later);
}

#[tokio::test]
async fn test_delivery_failures_retry_before_giving_up() {
    let db = setup_test_db().await;
    let gateway = DbScheduleGateway::new(db.clone());

    let fire_at = Utc::now() - Duration::seconds(5);
    let handle = gateway.start(input(Step::Start, fire_at)).await.unwrap();

    // The first failures leave the event pending, so later polls retry it
    for _ in 0..2 {
        let status = db.record_delivery_failure(&handle, 3).await.unwrap();
        assert_eq!(status, ScheduledEventStatus::Pending);
        let due = db.due_scheduled_events(10).await.unwrap();
        assert_eq!(due.len(), 1);
    }

    // The final attempt exhausts the budget
    let status = db.record_delivery_failure(&handle, 3).await.unwrap();
    assert_eq!(status, ScheduledEventStatus::Failed);
    assert!(db.due_scheduled_events(10).await.unwrap().is_empty());

    // A spent event is no longer cancellable either
    assert!(matches!(
        gateway.stop(&handle).await,
        Err(ScheduleError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_registrations_for_the_same_assignment_are_independent() {
    let db = setup_test_db().await;
    let gateway = DbScheduleGateway::new(db.clone());

    let fire_at = Utc::now() - Duration::seconds(5);
    let first = gateway.start(input(Step::Start, fire_at)).await.unwrap();
    let second = gateway.start(input(Step::Init, fire_at)).await.unwrap();
    assert_ne!(first, second);

    gateway.stop(&first).await.unwrap();

    let due = db.due_scheduled_events(10).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, second);
}
