//! Background task tracking over an external job runner.
//!
//! The application record is the durable truth about a task's existence and
//! completion; the runner only contributes live progress. Progress lookups
//! fail open to 100 when the runner has forgotten the job or is down, so a
//! lost runner can stall progress displays but never pin them below done.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::error::Error;
use super::ports::{JobRequest, JobRunner, TaskRepository};
use super::task::Task;
use super::user::UserId;

/// Application service for background tasks.
pub struct TaskService<T, J> {
    tasks: Arc<T>,
    runner: Arc<J>,
}

impl<T, J> TaskService<T, J>
where
    T: TaskRepository,
    J: JobRunner,
{
    /// Create the service over the task repository and job runner.
    pub fn new(tasks: Arc<T>, runner: Arc<J>) -> Self {
        Self { tasks, runner }
    }

    /// Enqueue a job and record it as an in-progress task.
    ///
    /// At most one incomplete task per name may exist for a user; a second
    /// launch is a conflict.
    pub fn launch(
        &self,
        user: UserId,
        name: &str,
        description: Option<String>,
        args: Value,
    ) -> Result<Task, Error> {
        if self.tasks.in_progress_named(user, name)?.is_some() {
            return Err(Error::conflict(format!(
                "a {name} task is already in progress"
            )));
        }

        let job_id = self.runner.enqueue(&JobRequest {
            name: name.to_owned(),
            user,
            args,
        })?;
        let task = Task {
            id: job_id,
            name: name.to_owned(),
            description,
            user,
            complete: false,
        };
        self.tasks.insert(&task)?;
        info!(task = %task.id, name, user = %user, "launched background task");
        Ok(task)
    }

    /// Incomplete tasks for the user.
    pub fn in_progress(&self, user: UserId) -> Result<Vec<Task>, Error> {
        Ok(self.tasks.in_progress(user)?)
    }

    /// The incomplete task with this name for the user, when one exists.
    pub fn in_progress_named(&self, user: UserId, name: &str) -> Result<Option<Task>, Error> {
        Ok(self.tasks.in_progress_named(user, name)?)
    }

    /// Completion percentage for a task.
    ///
    /// A completed task is always 100. Otherwise the runner is asked; an
    /// unknown job or a runner failure reads as 100 so a dead runner cannot
    /// leave tasks stuck mid-bar forever.
    pub fn progress(&self, task_id: &str) -> Result<u8, Error> {
        let task = self
            .tasks
            .find_by_id(task_id)?
            .ok_or_else(|| Error::not_found(format!("task {task_id} does not exist")))?;
        if task.complete {
            return Ok(100);
        }
        match self.runner.status(task_id) {
            Ok(Some(status)) => Ok(status.progress.min(100)),
            Ok(None) => Ok(100),
            Err(error) => {
                warn!(task = task_id, %error, "job runner unreachable; reporting task as done");
                Ok(100)
            }
        }
    }

    /// Completion callback: flip the task's durable completion flag.
    pub fn complete(&self, task_id: &str) -> Result<(), Error> {
        if !self.tasks.mark_complete(task_id)? {
            return Err(Error::not_found(format!("task {task_id} does not exist")));
        }
        Ok(())
    }
}
