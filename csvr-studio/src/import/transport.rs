//! HTTP multipart upload transport
//!
//! One request per file, no retry, no timeout. Completion is classified by
//! status code only: 200, 201 and 204 are success, anything else is parsed
//! into a [`RemoteError`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Url;

use super::file::FileBlob;
use crate::error::{StudioError, StudioResult};
use crate::remote::{RemoteError, RemoteService};

const USER_AGENT: &str = concat!("csvr-studio/", env!("CARGO_PKG_VERSION"));

/// Status codes treated as a successful upload
pub const SUCCESS_STATUSES: [u16; 3] = [200, 201, 204];

/// One file upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub url: Url,
    pub file: FileBlob,
    /// Extra request headers; the CSRF header is always set by the transport
    pub headers: Vec<(String, String)>,
    /// Sent as the `contentName` form field when present
    pub content_name: Option<String>,
}

/// Raw completion of an upload request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl UploadResponse {
    pub fn is_success(&self) -> bool {
        SUCCESS_STATUSES.contains(&self.status)
    }

    /// Success, or the parsed remote error for a POST
    pub fn into_result(self) -> Result<Self, RemoteError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(RemoteError::from_response(
                &self.body,
                "POST",
                self.status,
                &self.status_text,
            ))
        }
    }
}

/// Issues upload requests
///
/// Returns `Err` only when no HTTP response arrived; any response, including
/// error statuses, is `Ok` and classified by the caller.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> StudioResult<UploadResponse>;
}

/// reqwest-backed transport that always attaches the CSRF header
pub struct HttpUploadTransport {
    http_client: reqwest::Client,
    remote: RemoteService,
}

impl HttpUploadTransport {
    pub fn new(remote: RemoteService) -> StudioResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http_client,
            remote,
        })
    }

    /// Caller headers first, then the CSRF header, so callers can never override it
    fn build_headers(&self, extra: &[(String, String)]) -> StudioResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (key, value) in extra {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                csvr_common::Error::InvalidInput(format!("Invalid header name '{}': {}", key, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                csvr_common::Error::InvalidInput(format!("Invalid value for header '{}': {}", key, e))
            })?;
            headers.insert(name, value);
        }

        let (csrf_name, csrf_value) = self.remote.csrf_header()?;
        headers.insert(csrf_name, csrf_value);
        Ok(headers)
    }
}

fn build_form(file: FileBlob, content_name: Option<String>) -> StudioResult<Form> {
    let file_name = file.upload_name().map(str::to_string);
    let mime_type = file.mime_type.clone();

    let mut part = Part::bytes(file.data);
    if let Some(name) = file_name {
        part = part.file_name(name);
    }
    if let Some(mime) = mime_type.filter(|m| !m.is_empty()) {
        part = part.mime_str(&mime).map_err(|e| {
            csvr_common::Error::InvalidInput(format!("Invalid mime type '{}': {}", mime, e))
        })?;
    }

    let mut form = Form::new().part("file", part);
    if let Some(content_name) = content_name {
        form = form.text("contentName", content_name);
    }
    Ok(form)
}

#[async_trait]
impl UploadTransport for HttpUploadTransport {
    async fn upload(&self, request: UploadRequest) -> StudioResult<UploadResponse> {
        let headers = self.build_headers(&request.headers)?;
        let file_name = request.file.upload_name().map(str::to_string);
        let form = build_form(request.file, request.content_name)?;

        tracing::debug!(
            url = %request.url,
            file_name = ?file_name,
            "Sending multipart upload"
        );

        let response = self
            .http_client
            .post(request.url)
            .headers(headers)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StudioError::Transport(e.to_string()))?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let body = response.text().await.unwrap_or_else(|e| {
            tracing::warn!(status = status.as_u16(), error = %e, "Failed to read upload response body");
            String::new()
        });

        tracing::debug!(status = status.as_u16(), file_name = ?file_name, "Upload response received");

        Ok(UploadResponse {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::StaticCsrfToken;
    use std::sync::Arc;

    fn response(status: u16, body: &str) -> UploadResponse {
        UploadResponse {
            status,
            status_text: String::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_success_statuses() {
        for status in [200, 201, 204] {
            assert!(response(status, "").into_result().is_ok(), "{} should succeed", status);
        }
        for status in [202, 301, 400, 401, 403, 500] {
            assert!(response(status, "").into_result().is_err(), "{} should fail", status);
        }
    }

    #[test]
    fn test_failure_carries_server_message() {
        let err = response(400, r#"{"message":"Missing column 'title'"}"#)
            .into_result()
            .unwrap_err();
        assert_eq!(err.message, "Missing column 'title'");
        assert_eq!(err.method, "POST");
    }

    #[test]
    fn test_caller_cannot_override_csrf_header() {
        let remote = RemoteService::new(
            "http://studio.local/rest/api/",
            "X-CSRF-Token",
            Arc::new(StaticCsrfToken("real-token".into())),
        )
        .unwrap();
        let transport = HttpUploadTransport::new(remote).unwrap();

        let headers = transport
            .build_headers(&[
                ("x-csrf-token".to_string(), "forged".to_string()),
                ("site".to_string(), "corporate".to_string()),
            ])
            .unwrap();

        assert_eq!(headers.get("X-CSRF-Token").unwrap(), "real-token");
        assert_eq!(headers.get_all("X-CSRF-Token").iter().count(), 1);
        assert_eq!(headers.get("site").unwrap(), "corporate");
    }

    #[test]
    fn test_invalid_caller_header_rejected() {
        let remote = RemoteService::new(
            "http://studio.local/rest/api/",
            "X-CSRF-Token",
            Arc::new(StaticCsrfToken("t".into())),
        )
        .unwrap();
        let transport = HttpUploadTransport::new(remote).unwrap();

        let result = transport.build_headers(&[("bad header".to_string(), "v".to_string())]);
        assert!(matches!(result, Err(StudioError::Common(_))));
    }
}
