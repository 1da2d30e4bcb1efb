//! Background job submission and tracking

pub mod http_runner;
pub mod task_tracker;
pub mod tracker;

pub use http_runner::HttpJobRunner;
pub use task_tracker::{JobRunner, TaskJobTracker};
pub use tracker::{
    BackgroundJob, JobError, JobErrorCode, JobResult, JobState, JobTracker, RemoteJob,
    TrackableJob, TrackedJob,
};
