//! Remote service plumbing shared by the upload transport and the job runner
//!
//! - Request URI calculation against the configured studio base URL
//! - CSRF header name/value supply
//! - Parsing of structured remote-error payloads

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::error::{StudioError, StudioResult};
use csvr_common::config::TomlConfig;

/// Supplies the current anti-forgery token
///
/// The token belongs to the operator's session and may rotate, so it is read
/// per request rather than captured once.
pub trait CsrfTokenSource: Send + Sync {
    fn csrf_token(&self) -> String;
}

/// Fixed token, for sessions whose token never rotates
#[derive(Debug, Clone)]
pub struct StaticCsrfToken(pub String);

impl CsrfTokenSource for StaticCsrfToken {
    fn csrf_token(&self) -> String {
        self.0.clone()
    }
}

/// Base URL + CSRF header for the studio REST API
#[derive(Clone)]
pub struct RemoteService {
    base_url: Url,
    csrf_header_name: HeaderName,
    csrf_source: Arc<dyn CsrfTokenSource>,
}

impl std::fmt::Debug for RemoteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteService")
            .field("base_url", &self.base_url.as_str())
            .field("csrf_header_name", &self.csrf_header_name)
            .finish()
    }
}

impl RemoteService {
    pub fn new(
        base_url: &str,
        csrf_header_name: &str,
        csrf_source: Arc<dyn CsrfTokenSource>,
    ) -> StudioResult<Self> {
        // Url::join replaces the last path segment unless the base ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| StudioError::InvalidUrl {
            url: normalized.clone(),
            reason: e.to_string(),
        })?;
        let csrf_header_name = HeaderName::from_bytes(csrf_header_name.as_bytes()).map_err(|e| {
            csvr_common::Error::Config(format!(
                "Invalid CSRF header name '{}': {}",
                csrf_header_name, e
            ))
        })?;

        Ok(Self {
            base_url,
            csrf_header_name,
            csrf_source,
        })
    }

    pub fn from_config(
        config: &TomlConfig,
        csrf_source: Arc<dyn CsrfTokenSource>,
    ) -> StudioResult<Self> {
        Self::new(&config.studio_url, &config.csrf.header_name, csrf_source)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a REST path (e.g. `importcsv/uploadfile`) against the base URL
    pub fn calculate_request_uri(&self, path: &str) -> StudioResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| StudioError::InvalidUrl {
                url: path.to_string(),
                reason: e.to_string(),
            })
    }

    /// CSRF header name and current value
    pub fn csrf_header(&self) -> StudioResult<(HeaderName, HeaderValue)> {
        let token = self.csrf_source.csrf_token();
        let value = HeaderValue::from_str(&token).map_err(|e| {
            csvr_common::Error::InvalidInput(format!("CSRF token is not a valid header value: {}", e))
        })?;
        Ok((self.csrf_header_name.clone(), value))
    }
}

/// Parsed non-success response from the studio REST API
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{method} failed with HTTP {status}: {message}")]
pub struct RemoteError {
    pub method: String,
    pub status: u16,
    pub status_text: String,
    /// Machine-readable code, when the body carried one
    pub error_code: Option<String>,
    /// Text suitable for showing to the operator
    pub message: String,
}

impl RemoteError {
    /// Build from the raw response parts
    ///
    /// Message precedence: JSON `message` field → non-empty body text →
    /// status text → `HTTP <status>`.
    pub fn from_response(body: &str, method: &str, status: u16, status_text: &str) -> Self {
        let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let error_code = field("errorCode").or_else(|| field("errorName"));
        let message = field("message")
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .or_else(|| (!status_text.is_empty()).then(|| status_text.to_string()))
            .or_else(|| error_code.clone())
            .unwrap_or_else(|| format!("HTTP {}", status));

        Self {
            method: method.to_string(),
            status,
            status_text: status_text.to_string(),
            error_code,
            message,
        }
    }
}
