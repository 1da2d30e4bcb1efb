//! CSV import: drag-and-drop upload dialog
//!
//! Dropped files become [`FileUploadContainer`]s in an
//! [`UploadContainerCollection`]. Submit is enabled only when exactly one
//! valid file is queued; submitting fires one multipart upload per file and
//! closes the dialog without waiting.

pub mod collection;
pub mod container;
pub mod dialog;
pub mod file;
pub mod session;
pub mod transport;

pub use collection::UploadContainerCollection;
pub use container::{ContainerId, FileUploadContainer, RemovalHandle};
pub use dialog::{DialogEvent, ImportDialog, ImportDialogHandle, ImportDialogReport};
pub use file::FileBlob;
pub use session::{DropState, ImportSettings, ImportUploadSession, UploadOutcome};
pub use transport::{
    HttpUploadTransport, UploadRequest, UploadResponse, UploadTransport, SUCCESS_STATUSES,
};
