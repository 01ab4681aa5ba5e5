use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use hirerelay::domain::ports::clock::Clock;
use hirerelay::domain::ports::mailer::{MailConfig, MailError, Mailer};
use hirerelay::domain::ports::schedule_gateway::{ScheduleError, ScheduleGateway, StartInput};
use hirerelay::domain::ports::vcs::{
    CleanDetails, UploadDetails, VcsCleaner, VcsCollaboratorAdder, VcsCreator, VcsError,
    VcsSubmissionChecker, VcsUploader,
};
use hirerelay::providers::github::make_repo_name;

/// In-memory schedule gateway that records registrations and hands out
/// sequential handles.
#[derive(Default)]
pub struct FakeScheduleGateway {
    pub starts: Mutex<Vec<StartInput>>,
    pub stops: Mutex<Vec<String>>,
    pub fail_stop: AtomicBool,
    counter: AtomicUsize,
}

impl FakeScheduleGateway {
    pub fn started(&self) -> Vec<StartInput> {
        self.starts.lock().unwrap().clone()
    }

    pub fn stopped(&self) -> Vec<String> {
        self.stops.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScheduleGateway for FakeScheduleGateway {
    async fn start(&self, input: StartInput) -> Result<String, ScheduleError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.starts.lock().unwrap().push(input);
        Ok(format!("handle-{}", n))
    }

    async fn stop(&self, handle: &str) -> Result<(), ScheduleError> {
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(ScheduleError::NotFound(handle.to_string()));
        }
        self.stops.lock().unwrap().push(handle.to_string());
        Ok(())
    }
}

/// Single fake standing in for every repository-hosting concern.
#[derive(Default)]
pub struct FakeVcs {
    pub created: Mutex<Vec<(String, String, i64)>>,
    pub collaborators: Mutex<Vec<(String, String)>>,
    pub uploads: Mutex<Vec<UploadDetails>>,
    pub cleanups: Mutex<Vec<CleanDetails>>,
    pub already_collaborator: AtomicBool,
    pub submitted: AtomicBool,
    pub fail_upload: AtomicBool,
}

#[async_trait]
impl VcsCreator for FakeVcs {
    async fn create_repo(
        &self,
        business_name: &str,
        username: &str,
        assignment_id: i64,
    ) -> Result<String, VcsError> {
        self.created.lock().unwrap().push((
            business_name.to_string(),
            username.to_string(),
            assignment_id,
        ));
        let name = make_repo_name(business_name, username, assignment_id);
        Ok(format!("https://github.com/hirerelay/{}.git", name))
    }
}

#[async_trait]
impl VcsCollaboratorAdder for FakeVcs {
    async fn add_collaborator(&self, repo_url: &str, username: &str) -> Result<(), VcsError> {
        if self.already_collaborator.load(Ordering::SeqCst) {
            return Err(VcsError::AlreadyCollaborator(username.to_string()));
        }
        self.collaborators
            .lock()
            .unwrap()
            .push((repo_url.to_string(), username.to_string()));
        Ok(())
    }
}

#[async_trait]
impl VcsUploader for FakeVcs {
    async fn upload(&self, details: UploadDetails) -> Result<(), VcsError> {
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(VcsError::Api("upload failed".to_string()));
        }
        self.uploads.lock().unwrap().push(details);
        Ok(())
    }
}

#[async_trait]
impl VcsCleaner for FakeVcs {
    async fn cleanup(&self, details: CleanDetails) -> Result<(), VcsError> {
        self.cleanups.lock().unwrap().push(details);
        Ok(())
    }
}

#[async_trait]
impl VcsSubmissionChecker for FakeVcs {
    async fn is_submitted(&self, _repo_url: &str, _username: &str) -> Result<bool, VcsError> {
        Ok(self.submitted.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<MailConfig>>,
}

impl RecordingMailer {
    pub fn messages(&self) -> Vec<MailConfig> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, config: MailConfig, _assignment: &hirerelay::models::Assignment) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(config);
        Ok(())
    }
}

/// Clock pinned to a known instant so fire offsets are exact.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
