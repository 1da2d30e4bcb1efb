//! Tokio-backed job tracker
//!
//! Each submitted job runs on its own task through a [`JobRunner`]. Failed
//! attempts are resubmitted only for jobs that declare `may_retry()`, up to
//! the configured retry count. Jobs never abort one another.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use csvr_common::config::JobsConfig;
use csvr_common::events::{EventBus, StudioEvent};

use super::tracker::{JobError, JobResult, JobState, JobTracker, TrackableJob, TrackedJob};

/// Executes one attempt of a job on the server
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, job_type: &str, params: serde_json::Value) -> Result<JobResult, JobError>;
}

/// [`JobTracker`] that runs each job on a tokio task
#[derive(Clone)]
pub struct TaskJobTracker {
    runner: Arc<dyn JobRunner>,
    max_retries: u32,
    event_bus: EventBus,
}

impl TaskJobTracker {
    pub fn new(runner: Arc<dyn JobRunner>, event_bus: EventBus) -> Self {
        Self {
            runner,
            max_retries: JobsConfig::default().max_retries,
            event_bus,
        }
    }

    pub fn from_config(runner: Arc<dyn JobRunner>, config: &JobsConfig, event_bus: EventBus) -> Self {
        Self::new(runner, event_bus).with_max_retries(config.max_retries)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

impl JobTracker for TaskJobTracker {
    fn submit(&self, job: Arc<dyn TrackableJob>) -> TrackedJob {
        let (state_tx, handle) = TrackedJob::channel(job.as_ref());

        info!(
            job_id = %handle.id(),
            job_type = handle.job_type(),
            name = handle.name(),
            "Background job submitted"
        );
        self.event_bus.emit_lossy(StudioEvent::JobSubmitted {
            job_id: handle.id(),
            job_type: handle.job_type().to_string(),
            name: handle.name().to_string(),
            timestamp: chrono::Utc::now(),
        });

        tokio::spawn(run_job(
            Arc::clone(&self.runner),
            job,
            handle.clone(),
            state_tx,
            self.max_retries,
            self.event_bus.clone(),
        ));

        handle
    }
}

async fn run_job(
    runner: Arc<dyn JobRunner>,
    job: Arc<dyn TrackableJob>,
    handle: TrackedJob,
    state_tx: watch::Sender<JobState>,
    max_retries: u32,
    event_bus: EventBus,
) {
    let params = job.params();
    let mut attempt = 0u32;

    loop {
        match runner.run(job.job_type(), params.clone()).await {
            Ok(result) => {
                info!(job_id = %handle.id(), name = handle.name(), "Background job succeeded");
                job.on_success(&result);
                event_bus.emit_lossy(StudioEvent::JobSucceeded {
                    job_id: handle.id(),
                    name: handle.name().to_string(),
                    timestamp: chrono::Utc::now(),
                });
                state_tx.send_replace(JobState::Succeeded(result));
                return;
            }
            Err(error) if job.may_retry() && attempt < max_retries => {
                attempt += 1;
                warn!(
                    job_id = %handle.id(),
                    attempt,
                    max_retries,
                    error = %error,
                    "Background job attempt failed, retrying"
                );
            }
            Err(error) => {
                warn!(
                    job_id = %handle.id(),
                    name = handle.name(),
                    code = ?error.code,
                    error = %error,
                    "Background job failed"
                );
                job.on_error(&error);
                event_bus.emit_lossy(StudioEvent::JobFailed {
                    job_id: handle.id(),
                    name: handle.name().to_string(),
                    message: error.message.clone(),
                    timestamp: chrono::Utc::now(),
                });
                state_tx.send_replace(JobState::Failed(error));
                return;
            }
        }
    }
}
