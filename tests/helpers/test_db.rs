use hirerelay::database::Database;
use hirerelay::models::*;

pub async fn setup_test_db() -> Database {
    // Install drivers for AnyPool (required for tests)
    sqlx::any::install_default_drivers();

    // Unique file-based SQLite per test so tests can run in parallel
    use uuid::Uuid;
    let temp_file = format!("test_{}.db", Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", temp_file);

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    db
}

/// Standard fixture: an 8 hour assignment for alice at Acme.
pub fn test_assignment(id: i64) -> Assignment {
    Assignment {
        id,
        candidate_id: 7,
        candidate_name: "Alice".to_string(),
        test_day_chosen: Some("2024-06-01".to_string()),
        test_time_chosen: Some("09:00".to_string()),
        test_timezone_chosen: Some("UTC".to_string()),
        github_repo_url: String::new(),
        schedule_handle: String::new(),
        time_limit: 28800,
        status: AssignmentStatus::Sent,
        candidate: Candidate {
            email: "alice@example.com".to_string(),
            github_username: "alice".to_string(),
        },
        recruiter: Recruiter {
            email: "recruiter@acme.com".to_string(),
        },
        test: TestSpec {
            name: "Backend test".to_string(),
            github_repo: "https://github.com/acme/template.git".to_string(),
            installation_id: 100,
            business: Business {
                name: "Acme".to_string(),
            },
        },
    }
}

pub async fn seed_assignment(db: &Database, assignment: &Assignment) {
    db.create_assignment(assignment)
        .await
        .expect("Failed to seed assignment");
}
