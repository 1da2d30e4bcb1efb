//! Job tracking contract
//!
//! A job describes itself through two traits: [`RemoteJob`] (what the server
//! runs) and [`BackgroundJob`] (how the job list shows it and what happens
//! when it finishes). A [`JobTracker`] accepts a job and hands back a
//! [`TrackedJob`] whose state resolves at some later scheduler turn.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::remote::RemoteError;

/// Payload of a successfully finished job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub value: serde_json::Value,
}

impl JobResult {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }
}

/// Error codes the export job service reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobErrorCode {
    UserNotAuthorized,
    ParamTemplateMissing,
    RetrievalFailed,
    GenerationFailed,
}

impl JobErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobErrorCode::UserNotAuthorized => "USER_NOT_AUTHORIZED",
            JobErrorCode::ParamTemplateMissing => "PARAM_TEMPLATE_MISSING",
            JobErrorCode::RetrievalFailed => "RETRIEVAL_FAILED",
            JobErrorCode::GenerationFailed => "GENERATION_FAILED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "USER_NOT_AUTHORIZED" => Some(JobErrorCode::UserNotAuthorized),
            "PARAM_TEMPLATE_MISSING" => Some(JobErrorCode::ParamTemplateMissing),
            "RETRIEVAL_FAILED" => Some(JobErrorCode::RetrievalFailed),
            "GENERATION_FAILED" => Some(JobErrorCode::GenerationFailed),
            _ => None,
        }
    }
}

/// A job failed or was rejected by the server
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct JobError {
    pub code: Option<JobErrorCode>,
    /// HTTP status, when the failure came back as a response
    pub status: Option<u16>,
    pub message: String,
}

impl JobError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            status: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: JobErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            status: None,
            message: message.into(),
        }
    }

    pub fn from_remote(error: &RemoteError) -> Self {
        Self {
            code: error.error_code.as_deref().and_then(JobErrorCode::from_code),
            status: Some(error.status),
            message: error.message.clone(),
        }
    }
}

/// Lifecycle of a tracked job
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Running,
    Succeeded(JobResult),
    Failed(JobError),
}

impl JobState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, JobState::Running)
    }
}

/// What the server is asked to run
pub trait RemoteJob {
    fn job_type(&self) -> &str;

    /// Parameter object sent with the job
    fn params(&self) -> serde_json::Value;

    /// Whether the tracker may resubmit after a failure
    fn may_retry(&self) -> bool;
}

/// How a job appears in the job list and reacts to completion
pub trait BackgroundJob {
    fn name(&self) -> &str;

    fn icon_class(&self) -> &str;

    fn on_success(&self, result: &JobResult);

    fn on_error(&self, error: &JobError);
}

/// Everything a tracker needs from a job
pub trait TrackableJob: RemoteJob + BackgroundJob + Send + Sync {}

impl<T: RemoteJob + BackgroundJob + Send + Sync> TrackableJob for T {}

/// Handle to a submitted job
///
/// Cheap to clone; every clone observes the same state.
#[derive(Debug, Clone)]
pub struct TrackedJob {
    id: Uuid,
    job_type: String,
    name: String,
    icon_class: String,
    state: watch::Receiver<JobState>,
}

impl TrackedJob {
    /// New handle in `Running` state plus the sender the tracker completes it with
    pub fn channel(job: &dyn TrackableJob) -> (watch::Sender<JobState>, TrackedJob) {
        let (tx, rx) = watch::channel(JobState::Running);
        let handle = TrackedJob {
            id: Uuid::new_v4(),
            job_type: job.job_type().to_string(),
            name: job.name().to_string(),
            icon_class: job.icon_class().to_string(),
            state: rx,
        };
        (tx, handle)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon_class(&self) -> &str {
        &self.icon_class
    }

    pub fn state(&self) -> JobState {
        self.state.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.state.borrow().is_finished()
    }

    /// Result, once the job has succeeded
    pub fn result(&self) -> Option<JobResult> {
        match &*self.state.borrow() {
            JobState::Succeeded(result) => Some(result.clone()),
            _ => None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.state.clone()
    }

    /// Wait until the job finishes
    ///
    /// There is no timeout; a job the server never finishes never resolves.
    pub async fn wait(&self) -> Result<JobResult, JobError> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(JobState::is_finished)
            .await
            .map_err(|_| JobError::new("Job tracker dropped the job before it finished"))?
            .clone();

        match state {
            JobState::Succeeded(result) => Ok(result),
            JobState::Failed(error) => Err(error),
            JobState::Running => Err(JobError::new("Job still running")),
        }
    }
}

/// Accepts jobs and tracks them to completion
///
/// Exactly one of the job's `on_success` / `on_error` handlers runs, before
/// the handle's state becomes final.
pub trait JobTracker: Send + Sync {
    fn submit(&self, job: Arc<dyn TrackableJob>) -> TrackedJob;
}
