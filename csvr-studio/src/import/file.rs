//! Dropped file handles and file type classification

use std::path::Path;

use crate::error::StudioResult;

/// A selected file's bytes plus the metadata the browser/OS reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    /// Standard file name property
    pub name: Option<String>,
    /// Older engines report the name only under this property
    pub legacy_file_name: Option<String>,
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

impl FileBlob {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: Some(name.into()),
            legacy_file_name: None,
            mime_type: Some(mime_type.into()),
            data,
        }
    }

    /// Read a file from disk, guessing the mime type from its extension
    pub async fn from_path(path: &Path) -> StudioResult<Self> {
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);
        let mime_type = name.as_deref().map(|n| guess_mime_type(n).to_string());

        Ok(Self {
            name,
            legacy_file_name: None,
            mime_type,
            data,
        })
    }

    /// Name to send as the multipart filename
    pub fn upload_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.legacy_file_name.as_deref().filter(|n| !n.is_empty()))
    }

    /// Derived type classification, e.g. `csv`
    pub fn file_type(&self) -> String {
        classify(self.upload_name(), self.mime_type.as_deref())
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Extension of the name wins; mime type is the fallback
fn classify(name: Option<&str>, mime_type: Option<&str>) -> String {
    if let Some(ext) = name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
    {
        return ext.to_ascii_lowercase();
    }

    match mime_type.map(|m| m.trim().to_ascii_lowercase()) {
        Some(m) if m == "text/csv" || m == "application/csv" => "csv".to_string(),
        Some(m) => m
            .split('/')
            .nth(1)
            .and_then(|sub| sub.split(';').next())
            .unwrap_or_default()
            .to_string(),
        None => String::new(),
    }
}

fn guess_mime_type(name: &str) -> &'static str {
    match Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("csv") => "text/csv",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        _ => "application/octet-stream",
    }
}
