//! UI collaborator interfaces
//!
//! Dialog chrome, message boxes and navigation live outside this crate. The
//! core drives them through these traits and never inspects widget state.

use reqwest::Url;

use crate::import::{ContainerId, FileUploadContainer};
use crate::jobs::JobResult;

/// Operator-facing labels
pub mod labels {
    pub const IMPORT_STATUS_TITLE: &str = "Import Status";
    pub const IMPORT_SUCCESS_TEXT: &str = "Successfully updated content";
    pub const IMPORT_FAILED_PREFIX: &str = "Import failed: ";

    pub const UPLOAD_PROGRESS_TITLE: &str = "Upload";
    pub const UPLOAD_PROGRESS_TEXT: &str = "Preparing files for upload...";

    pub const EXPORT_SEARCH_RESULT_TEXT: &str = "Export search result items?";
    pub const EXPORT_ROOT_FOLDER_TEXT: &str = "Export all items in folder?";

    pub const EXPORT_SUCCESS_TITLE: &str = "Background CSV Export Success";

    pub fn export_folder_text(folder_name: &str) -> String {
        format!("Export all items in folder '{}'?", folder_name)
    }

    pub fn export_success_text(job_name: &str) -> String {
        format!("{} completed successfully.", job_name)
    }
}

/// Message-box style notifications
pub trait Notifier: Send + Sync {
    fn show_info(&self, title: &str, message: &str);
    fn show_error(&self, title: &str, message: &str);
}

/// Notifier that only writes to the log, for headless use
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_info(&self, title: &str, message: &str) {
        tracing::info!(title, "{}", message);
    }

    fn show_error(&self, title: &str, message: &str) {
        tracing::warn!(title, "{}", message);
    }
}

/// Moves the operator somewhere else in the application
pub trait Navigator: Send + Sync {
    /// Open a URL (direct CSV download)
    fn open_url(&self, url: &Url);

    /// Show a finished job's result in the repository view
    fn show_in_repository(&self, result: &JobResult);
}

/// The import dialog's widgets
pub trait UploadDialogView: Send {
    /// Modal, non-closable progress indicator
    fn show_progress(&mut self, title: &str, message: &str);
    fn hide_progress(&mut self);
    fn set_drop_area_visible(&mut self, visible: bool);
    /// Add a panel for a queued file
    fn render_container(&mut self, container: &FileUploadContainer);
    fn remove_container(&mut self, id: ContainerId);
    fn close(&mut self);
}

/// The export dialog's widgets
pub trait ExportDialogView: Send {
    fn close(&mut self);
    fn copy_to_clipboard(&mut self, text: &str);
}
