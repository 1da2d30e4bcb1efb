//! One queued file plus its validity and render state

use std::fmt;

use tokio::sync::mpsc::WeakUnboundedSender;
use uuid::Uuid;

use super::dialog::DialogEvent;
use super::file::FileBlob;

/// Identity of a container within its collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(Uuid);

impl ContainerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Removal callback bound to a container
///
/// Posts `DialogEvent::RemoveFile` back to the owning session's event loop.
/// Holds a weak sender so queued files do not keep a closed dialog's loop alive.
#[derive(Debug, Clone)]
pub struct RemovalHandle {
    id: ContainerId,
    tx: WeakUnboundedSender<DialogEvent>,
}

impl RemovalHandle {
    /// Ask the session to remove this container
    ///
    /// Returns false when the dialog is already gone.
    pub fn request_removal(&self) -> bool {
        self.tx
            .upgrade()
            .map(|tx| tx.send(DialogEvent::RemoveFile(self.id)).is_ok())
            .unwrap_or(false)
    }
}

/// A dropped file waiting for upload
///
/// Only `is_rendered` changes after construction.
#[derive(Debug, Clone)]
pub struct FileUploadContainer {
    id: ContainerId,
    file: FileBlob,
    file_type: String,
    is_valid: bool,
    is_rendered: bool,
    removal: RemovalHandle,
}

impl FileUploadContainer {
    /// Wrap `file`; it is valid iff its type equals `accepted_type`
    pub fn new(file: FileBlob, accepted_type: &str, tx: WeakUnboundedSender<DialogEvent>) -> Self {
        let id = ContainerId::new();
        let file_type = file.file_type();
        let is_valid = file_type.eq_ignore_ascii_case(accepted_type);

        Self {
            id,
            file,
            file_type,
            is_valid,
            is_rendered: false,
            removal: RemovalHandle { id, tx },
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn file(&self) -> &FileBlob {
        &self.file
    }

    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn is_rendered(&self) -> bool {
        self.is_rendered
    }

    pub(crate) fn mark_rendered(&mut self) {
        self.is_rendered = true;
    }

    /// Handle the view's remove button calls
    pub fn removal_handle(&self) -> RemovalHandle {
        self.removal.clone()
    }
}
