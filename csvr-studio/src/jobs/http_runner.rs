//! HTTP job runner
//!
//! POSTs `{"jobType": ..., "params": ...}` to the studio jobs endpoint. A 2xx
//! response body (JSON, or text when it is not JSON) becomes the
//! [`JobResult`]; anything else is parsed as a remote error.

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;

use csvr_common::config::TomlConfig;

use super::task_tracker::JobRunner;
use super::tracker::{JobError, JobResult};
use crate::error::StudioResult;
use crate::remote::{RemoteError, RemoteService};

const USER_AGENT: &str = concat!("csvr-studio/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobSubmission<'a> {
    job_type: &'a str,
    params: serde_json::Value,
}

/// [`JobRunner`] that submits jobs to the studio REST API
pub struct HttpJobRunner {
    http_client: reqwest::Client,
    remote: RemoteService,
    endpoint: Url,
}

impl HttpJobRunner {
    pub fn new(remote: RemoteService, endpoint_path: &str) -> StudioResult<Self> {
        let endpoint = remote.calculate_request_uri(endpoint_path)?;
        let http_client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http_client,
            remote,
            endpoint,
        })
    }

    pub fn from_config(config: &TomlConfig, remote: RemoteService) -> StudioResult<Self> {
        Self::new(remote, &config.jobs.endpoint_path)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl JobRunner for HttpJobRunner {
    async fn run(&self, job_type: &str, params: serde_json::Value) -> Result<JobResult, JobError> {
        let (csrf_name, csrf_value) = self
            .remote
            .csrf_header()
            .map_err(|e| JobError::new(e.to_string()))?;

        tracing::debug!(url = %self.endpoint, job_type, "Submitting job");

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header(csrf_name, csrf_value)
            .json(&JobSubmission { job_type, params })
            .send()
            .await
            .map_err(|e| JobError::new(format!("Transport error: {}", e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_else(|e| {
            tracing::warn!(status = status.as_u16(), error = %e, "Failed to read job response body");
            String::new()
        });

        if status.is_success() {
            let value = if body.trim().is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body))
            };
            Ok(JobResult::new(value))
        } else {
            let remote = RemoteError::from_response(
                &body,
                "POST",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            );
            Err(JobError::from_remote(&remote))
        }
    }
}
