//! Import dialog event loop
//!
//! All session mutation happens on one task. UI input arrives as
//! [`DialogEvent`]s and is handled strictly in issuance order; after each
//! event the loop yields one scheduler turn, runs deferred work and then
//! republishes the submit binding.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use csvr_common::events::EventBus;

use super::container::ContainerId;
use super::file::FileBlob;
use super::session::{ImportSettings, ImportUploadSession, UploadOutcome};
use super::transport::UploadTransport;
use crate::ui::{Notifier, UploadDialogView};

/// Input to the import dialog's event loop
#[derive(Debug)]
pub enum DialogEvent {
    FilesDropped(Vec<FileBlob>),
    RemoveFile(ContainerId),
    Submit,
    Close,
}

/// What the loop leaves behind once the dialog is gone
#[derive(Debug, Default)]
pub struct ImportDialogReport {
    /// Uploads started by submit; they outlive the dialog
    pub uploads: Vec<JoinHandle<UploadOutcome>>,
}

/// UI-facing sender for a running import dialog
#[derive(Debug, Clone)]
pub struct ImportDialogHandle {
    tx: mpsc::UnboundedSender<DialogEvent>,
    submit_disabled: watch::Receiver<bool>,
}

impl ImportDialogHandle {
    pub fn drop_files(&self, files: Vec<FileBlob>) -> bool {
        self.send(DialogEvent::FilesDropped(files))
    }

    pub fn remove_file(&self, id: ContainerId) -> bool {
        self.send(DialogEvent::RemoveFile(id))
    }

    pub fn submit(&self) -> bool {
        self.send(DialogEvent::Submit)
    }

    pub fn close(&self) -> bool {
        self.send(DialogEvent::Close)
    }

    /// Binding for the submit button's `disabled` property
    pub fn submit_disabled(&self) -> watch::Receiver<bool> {
        self.submit_disabled.clone()
    }

    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&self, event: DialogEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Opens import dialogs
pub struct ImportDialog;

impl ImportDialog {
    /// Create a session and spawn its event loop
    pub fn open(
        settings: ImportSettings,
        transport: Arc<dyn UploadTransport>,
        notifier: Arc<dyn Notifier>,
        view: Box<dyn UploadDialogView>,
        event_bus: EventBus,
    ) -> (ImportDialogHandle, JoinHandle<ImportDialogReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = ImportUploadSession::new(
            settings,
            transport,
            notifier,
            view,
            event_bus,
            tx.downgrade(),
        );
        let handle = ImportDialogHandle {
            tx,
            submit_disabled: session.submit_disabled(),
        };
        let task = tokio::spawn(run_event_loop(session, rx));
        (handle, task)
    }
}

/// Process dialog events until the dialog closes or every sender is gone
pub async fn run_event_loop(
    mut session: ImportUploadSession,
    mut rx: mpsc::UnboundedReceiver<DialogEvent>,
) -> ImportDialogReport {
    let mut report = ImportDialogReport::default();
    session.publish_bindings();

    while let Some(event) = rx.recv().await {
        match event {
            DialogEvent::FilesDropped(files) => session.on_files_dropped(files),
            DialogEvent::RemoveFile(id) => session.remove_file_container(id),
            DialogEvent::Submit => match session.submit() {
                Ok(handles) => report.uploads.extend(handles),
                Err(e) => debug!(error = %e, "Submit ignored"),
            },
            DialogEvent::Close => session.close(),
        }

        if session.is_closed() {
            break;
        }

        // Let the progress indicator paint before deferred work hides it
        tokio::task::yield_now().await;
        session.run_deferred();
        session.publish_bindings();
    }

    session.close();
    debug!(uploads = report.uploads.len(), "Import dialog event loop finished");
    report
}
