//! Test Helper Utilities
//!
//! Shared utilities for testing csvr-studio

#![allow(dead_code)]

pub mod fakes;
pub mod log_capture;

use csvr_studio::import::{FileBlob, ImportSettings};
use reqwest::Url;

// Re-export commonly used items
pub use fakes::{
    response, wait_until, ExportViewLog, GatedTransport, Notice, NoticeKind, RecordingNavigator,
    RecordingNotifier, RecordingRunner, ViewCall, ViewLog,
};
pub use log_capture::{capture_logs, LogCapture, LogRecord};

pub const UPLOAD_URL: &str = "http://studio.local/rest/api/importcsv/uploadfile";

pub fn import_settings() -> ImportSettings {
    ImportSettings {
        upload_url: Url::parse(UPLOAD_URL).unwrap(),
        accepted_file_type: "csv".to_string(),
        headers: Vec::new(),
        content_name: None,
    }
}

pub fn csv_file(name: &str) -> FileBlob {
    FileBlob::new(name, "text/csv", b"title,teaser\nHello,World\n".to_vec())
}

pub fn text_file(name: &str) -> FileBlob {
    FileBlob::new(name, "text/plain", b"not a csv".to_vec())
}
