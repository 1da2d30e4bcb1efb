//! Background CSV export job
//!
//! The job's display name is generated once at construction and written into
//! the submitted parameters, so the job list and the server's result both
//! carry the same name. Export jobs are never retried.

use std::sync::{Arc, OnceLock};

use tracing::{debug, info};

use csvr_common::time;

use super::params::{params_to_json, ParamMap, ParamValue};
use super::request::TEMPLATE_KEY;
use crate::error::{StudioError, StudioResult};
use crate::jobs::{
    BackgroundJob, JobError, JobResult, JobTracker, RemoteJob, TrackableJob, TrackedJob,
};
use crate::ui::{labels, Navigator, Notifier};

pub const JOB_TYPE: &str = "csvReporterExport";
pub const NAME_PREFIX: &str = "CSV Export ";
pub const NAME_KEY: &str = "name";
pub const ICON_CLASS: &str = "csvr-export-job-icon";

/// Per-invocation failure handler
pub type ErrorHandler = Arc<dyn Fn(&JobError) + Send + Sync>;

/// One background export request
pub struct ExportJobDescriptor {
    name: String,
    params: ParamMap,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    error_handler: Option<ErrorHandler>,
    tracked: OnceLock<TrackedJob>,
}

impl std::fmt::Debug for ExportJobDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportJobDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("tracked", &self.tracked.get().map(TrackedJob::id))
            .finish()
    }
}

impl ExportJobDescriptor {
    /// Name the job after the current local time and bake the name into `params`
    pub fn new(
        mut params: ParamMap,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let name = format!("{}{}", NAME_PREFIX, time::format_local(&time::now()));
        params.insert(NAME_KEY.to_string(), ParamValue::Single(name.clone()));

        Self {
            name,
            params,
            navigator,
            notifier,
            error_handler: None,
            tracked: OnceLock::new(),
        }
    }

    /// Replace the default (log-only) failure handler
    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    pub fn job_params(&self) -> &ParamMap {
        &self.params
    }

    pub fn template(&self) -> Option<&str> {
        self.params.get(TEMPLATE_KEY).and_then(ParamValue::as_str)
    }

    /// Handle retained from submission
    pub fn tracked_job(&self) -> Option<&TrackedJob> {
        self.tracked.get()
    }

    /// Hand the job to the tracker and retain the tracked handle
    ///
    /// Fails without submitting when no template is set or when the
    /// descriptor was already submitted.
    pub fn submit(self: &Arc<Self>, tracker: &dyn JobTracker) -> StudioResult<TrackedJob> {
        if self.template().map_or(true, str::is_empty) {
            return Err(StudioError::ValidationBlocked(
                "an export template must be selected".to_string(),
            ));
        }
        if self.tracked.get().is_some() {
            return Err(StudioError::ValidationBlocked(format!(
                "'{}' was already submitted",
                self.name
            )));
        }

        let job = Arc::clone(self) as Arc<dyn TrackableJob>;
        let handle = tracker.submit(job);
        info!(job_id = %handle.id(), name = %self.name, "CSV export job started");

        self.tracked.set(handle.clone()).map_err(|_| {
            StudioError::ValidationBlocked(format!("'{}' was already submitted", self.name))
        })?;
        Ok(handle)
    }

    /// Open the finished job's result; false when there is no result yet
    pub fn show_result(&self) -> bool {
        match self.tracked.get().and_then(TrackedJob::result) {
            Some(result) => {
                self.navigator.show_in_repository(&result);
                true
            }
            None => false,
        }
    }
}

impl RemoteJob for ExportJobDescriptor {
    fn job_type(&self) -> &str {
        JOB_TYPE
    }

    fn params(&self) -> serde_json::Value {
        params_to_json(&self.params)
    }

    fn may_retry(&self) -> bool {
        false
    }
}

impl BackgroundJob for ExportJobDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn icon_class(&self) -> &str {
        ICON_CLASS
    }

    fn on_success(&self, result: &JobResult) {
        self.navigator.show_in_repository(result);
        self.notifier.show_info(
            labels::EXPORT_SUCCESS_TITLE,
            &labels::export_success_text(&self.name),
        );
    }

    fn on_error(&self, error: &JobError) {
        match &self.error_handler {
            Some(handler) => handler(error),
            // The job list shows failed jobs itself
            None => debug!(name = %self.name, error = %error, "CSV export job failed"),
        }
    }
}
