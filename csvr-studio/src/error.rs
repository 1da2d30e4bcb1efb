//! Error types for csvr-studio
//!
//! Transport, remote and job errors are terminal for their own unit of work
//! (one file, one job) and never abort siblings. Nothing is retried here.

use thiserror::Error;

use crate::jobs::JobError;
use crate::remote::RemoteError;

/// Studio client error type
#[derive(Debug, Error)]
pub enum StudioError {
    /// Action invoked while its enabling computed value says "disabled"
    #[error("Action blocked: {0}")]
    ValidationBlocked(String),

    /// No HTTP response was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP response
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Background job failed or was rejected
    #[error("Job failed: {0}")]
    JobSubmission(#[from] JobError),

    /// A configured or computed URL did not parse
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// csvr-common error
    #[error("Common error: {0}")]
    Common(#[from] csvr_common::Error),
}

impl From<reqwest::Error> for StudioError {
    fn from(err: reqwest::Error) -> Self {
        StudioError::Transport(err.to_string())
    }
}

impl From<std::io::Error> for StudioError {
    fn from(err: std::io::Error) -> Self {
        StudioError::Common(csvr_common::Error::Io(err))
    }
}

/// Result type for studio operations
pub type StudioResult<T> = Result<T, StudioError>;
