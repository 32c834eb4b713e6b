//! In-process job runner.
//!
//! Stands in for an external worker queue: enqueued jobs get a fresh
//! opaque id and start at zero progress, and the test harness drives their
//! progress by hand. The runner deliberately forgets nothing on its own;
//! `forget` models queue-side expiry of finished jobs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

use crate::domain::ports::{JobRequest, JobRunner, JobRunnerError, JobStatus};

/// In-memory implementation of the `JobRunner` port.
#[derive(Debug, Default)]
pub struct InMemoryJobRunner {
    jobs: Mutex<HashMap<String, u8>>,
    offline: AtomicBool,
}

impl InMemoryJobRunner {
    /// A runner with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the queue infrastructure being unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Drive a job's reported progress.
    pub fn set_progress(&self, job_id: &str, progress: u8) {
        if let Ok(mut jobs) = self.jobs.lock()
            && let Some(entry) = jobs.get_mut(job_id)
        {
            *entry = progress;
        }
    }

    /// Drop a job, as a queue does once a finished job expires.
    pub fn forget(&self, job_id: &str) {
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.remove(job_id);
        }
    }

    fn check_online(&self) -> Result<(), JobRunnerError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(JobRunnerError::unavailable("job queue is offline"));
        }
        Ok(())
    }
}

impl JobRunner for InMemoryJobRunner {
    fn enqueue(&self, _request: &JobRequest) -> Result<String, JobRunnerError> {
        self.check_online()?;
        let job_id = Uuid::new_v4().to_string();
        self.jobs
            .lock()
            .map_err(|_| JobRunnerError::unavailable("job table lock poisoned"))?
            .insert(job_id.clone(), 0);
        Ok(job_id)
    }

    fn status(&self, job_id: &str) -> Result<Option<JobStatus>, JobRunnerError> {
        self.check_online()?;
        let jobs = self
            .jobs
            .lock()
            .map_err(|_| JobRunnerError::unavailable("job table lock poisoned"))?;
        Ok(jobs.get(job_id).map(|progress| JobStatus {
            progress: *progress,
        }))
    }
}
