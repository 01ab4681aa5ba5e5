mod helpers;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use helpers::*;
use hirerelay::api::middleware::error::ApiError;
use hirerelay::domain::ports::assignment_repository::AssignmentRepository;
use hirerelay::models::Step;
use hirerelay::services::AssignmentScheduler;

fn scheduler(
    db: &hirerelay::database::Database,
    gateway: Arc<FakeScheduleGateway>,
    vcs: Arc<FakeVcs>,
) -> AssignmentScheduler {
    AssignmentScheduler::new(Arc::new(db.clone()), gateway, vcs)
}

#[tokio::test]
async fn test_schedule_creates_repo_and_arms_start_step() {
    let db = setup_test_db().await;
    let assignment = test_assignment(42);
    seed_assignment(&db, &assignment).await;

    let gateway = Arc::new(FakeScheduleGateway::default());
    let vcs = Arc::new(FakeVcs::default());
    scheduler(&db, gateway.clone(), vcs.clone())
        .start(42)
        .await
        .expect("Failed to schedule assignment");

    let created = vcs.created.lock().unwrap().clone();
    assert_eq!(created, vec![("Acme".to_string(), "alice".to_string(), 42)]);

    let starts = gateway.started();
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].step, Step::Start);
    assert_eq!(starts[0].assignment_id, 42);
    // 09:00 start minus the five minute reminder lead
    assert_eq!(
        starts[0].schedule_at,
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 55, 0).unwrap()
    );
    // 8 hours minus the reserved lead and warning windows
    assert_eq!(starts[0].duration, 28200);
    assert_eq!(
        starts[0].data.github_repo_url,
        "https://github.com/hirerelay/alice-acme-test-42.git"
    );

    let stored = db.get_assignment(42).await.unwrap();
    assert_eq!(stored.schedule_handle, "handle-1");
    assert_eq!(
        stored.github_repo_url,
        "https://github.com/hirerelay/alice-acme-test-42.git"
    );
    assert_eq!(stored.status.as_str(), "scheduled");
}

#[tokio::test]
async fn test_reschedule_stops_old_handle_and_keeps_repo_url() {
    let db = setup_test_db().await;
    let mut assignment = test_assignment(42);
    assignment.github_repo_url = "https://github.com/hirerelay/existing.git".to_string();
    assignment.schedule_handle = "old-handle".to_string();
    seed_assignment(&db, &assignment).await;

    let gateway = Arc::new(FakeScheduleGateway::default());
    let vcs = Arc::new(FakeVcs::default());
    scheduler(&db, gateway.clone(), vcs.clone())
        .start(42)
        .await
        .expect("Failed to reschedule assignment");

    assert_eq!(gateway.stopped(), vec!["old-handle".to_string()]);
    // No second repo: the URL is set at most once
    assert!(vcs.created.lock().unwrap().is_empty());

    let stored = db.get_assignment(42).await.unwrap();
    assert_eq!(stored.schedule_handle, "handle-1");
    assert_eq!(
        stored.github_repo_url,
        "https://github.com/hirerelay/existing.git"
    );
}

#[tokio::test]
async fn test_stop_failure_aborts_reschedule() {
    let db = setup_test_db().await;
    let mut assignment = test_assignment(42);
    assignment.schedule_handle = "old-handle".to_string();
    seed_assignment(&db, &assignment).await;

    let gateway = Arc::new(FakeScheduleGateway::default());
    gateway
        .fail_stop
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let vcs = Arc::new(FakeVcs::default());
    let result = scheduler(&db, gateway.clone(), vcs.clone()).start(42).await;

    assert!(matches!(result, Err(ApiError::Internal(_))));
    assert!(gateway.started().is_empty());
    assert!(vcs.created.lock().unwrap().is_empty());

    let stored = db.get_assignment(42).await.unwrap();
    assert_eq!(stored.schedule_handle, "old-handle");
}

#[tokio::test]
async fn test_invalid_timezone_rejected_before_side_effects() {
    let db = setup_test_db().await;
    let mut assignment = test_assignment(42);
    assignment.test_timezone_chosen = Some("Mars/Olympus".to_string());
    seed_assignment(&db, &assignment).await;

    let gateway = Arc::new(FakeScheduleGateway::default());
    let vcs = Arc::new(FakeVcs::default());
    let result = scheduler(&db, gateway.clone(), vcs.clone()).start(42).await;

    assert!(matches!(result, Err(ApiError::BadRequest(_))));
    assert!(gateway.started().is_empty());
    assert!(vcs.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_stop_cancels_active_handle() {
    let db = setup_test_db().await;
    let mut assignment = test_assignment(42);
    assignment.schedule_handle = "active-handle".to_string();
    seed_assignment(&db, &assignment).await;

    let gateway = Arc::new(FakeScheduleGateway::default());
    let vcs = Arc::new(FakeVcs::default());
    scheduler(&db, gateway.clone(), vcs)
        .stop(42)
        .await
        .expect("Failed to stop assignment");

    assert_eq!(gateway.stopped(), vec!["active-handle".to_string()]);
}

#[tokio::test]
async fn test_scheduling_unknown_assignment_is_not_found() {
    let db = setup_test_db().await;

    let gateway = Arc::new(FakeScheduleGateway::default());
    let vcs = Arc::new(FakeVcs::default());
    let result = scheduler(&db, gateway, vcs).start(999).await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
}
