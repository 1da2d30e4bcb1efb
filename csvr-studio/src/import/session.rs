//! Import upload session: drop handling, validation and submission
//!
//! Two drop states:
//! - `DropEnabled`: the drop area accepts files
//! - `DropDisabled`: at least one file is queued; further drops are ignored
//!
//! Dropping is two-phase. Containers are created and appended synchronously
//! while the progress indicator is up; hiding the indicator and rendering the
//! new containers is queued as deferred work that the event loop runs on the
//! next scheduler turn, so the indicator is visible for at least one frame.

use std::collections::VecDeque;
use std::sync::Arc;

use reqwest::Url;
use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use csvr_common::config::TomlConfig;
use csvr_common::events::{EventBus, StudioEvent};
use csvr_common::ValueExpression;

use super::collection::UploadContainerCollection;
use super::container::{ContainerId, FileUploadContainer};
use super::dialog::DialogEvent;
use super::file::FileBlob;
use super::transport::{UploadRequest, UploadTransport};
use crate::error::{StudioError, StudioResult};
use crate::remote::RemoteService;
use crate::ui::{labels, Notifier, UploadDialogView};

/// Drop target state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropState {
    DropEnabled,
    DropDisabled,
}

/// Where and how files are uploaded
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub upload_url: Url,
    /// File type a container must have to be valid
    pub accepted_file_type: String,
    /// Extra headers sent with every upload (e.g. `site`, `folderUri`)
    pub headers: Vec<(String, String)>,
    pub content_name: Option<String>,
}

impl ImportSettings {
    pub fn from_config(config: &TomlConfig, remote: &RemoteService) -> StudioResult<Self> {
        Ok(Self {
            upload_url: remote.calculate_request_uri(&config.import.upload_path)?,
            accepted_file_type: config.import.accepted_file_type.clone(),
            headers: Vec::new(),
            content_name: None,
        })
    }
}

/// Result of one fire-and-forget upload
#[derive(Debug)]
pub enum UploadOutcome {
    Succeeded {
        file_name: Option<String>,
        status: u16,
    },
    Failed {
        file_name: Option<String>,
        error: StudioError,
    },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Succeeded { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredTask {
    FinishDrop,
}

/// Owns the upload collection and drives the import dialog
pub struct ImportUploadSession {
    settings: ImportSettings,
    /// Created on the first validity check or drop
    collection: Option<UploadContainerCollection>,
    drop_state: DropState,
    deferred: VecDeque<DeferredTask>,
    submit_disabled: ValueExpression<bool>,
    transport: Arc<dyn UploadTransport>,
    notifier: Arc<dyn Notifier>,
    view: Box<dyn UploadDialogView>,
    event_bus: EventBus,
    loop_tx: WeakUnboundedSender<DialogEvent>,
    closed: bool,
}

impl ImportUploadSession {
    pub fn new(
        settings: ImportSettings,
        transport: Arc<dyn UploadTransport>,
        notifier: Arc<dyn Notifier>,
        view: Box<dyn UploadDialogView>,
        event_bus: EventBus,
        loop_tx: WeakUnboundedSender<DialogEvent>,
    ) -> Self {
        Self {
            settings,
            collection: None,
            drop_state: DropState::DropEnabled,
            deferred: VecDeque::new(),
            submit_disabled: ValueExpression::new(true),
            transport,
            notifier,
            view,
            event_bus,
            loop_tx,
            closed: false,
        }
    }

    pub fn drop_state(&self) -> DropState {
        self.drop_state
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.collection.as_ref().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn containers(&self) -> impl Iterator<Item = &FileUploadContainer> {
        self.collection.iter().flat_map(|c| c.iter())
    }

    pub fn has_deferred_work(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Binding for the submit button's `disabled` property
    pub fn submit_disabled(&self) -> watch::Receiver<bool> {
        self.submit_disabled.subscribe()
    }

    /// True ("disable submit") unless exactly one valid file is queued
    pub fn upload_disabled(&mut self) -> bool {
        self.collection
            .get_or_insert_with(UploadContainerCollection::new)
            .invalidity()
    }

    /// Re-derive validity and push it to bound consumers
    pub fn publish_bindings(&mut self) {
        let disabled = self.upload_disabled();
        self.submit_disabled.set_value(disabled);
    }

    /// Accept dropped files; ignored entirely while drops are disabled
    pub fn on_files_dropped(&mut self, files: Vec<FileBlob>) {
        if self.drop_state == DropState::DropDisabled {
            debug!(count = files.len(), "Drop ignored: drop area disabled");
            return;
        }
        if files.is_empty() {
            return;
        }

        self.view
            .show_progress(labels::UPLOAD_PROGRESS_TITLE, labels::UPLOAD_PROGRESS_TEXT);
        self.drop_state = DropState::DropDisabled;

        let count = files.len();
        let collection = self
            .collection
            .get_or_insert_with(UploadContainerCollection::new);
        for file in files {
            let container = FileUploadContainer::new(
                file,
                &self.settings.accepted_file_type,
                self.loop_tx.clone(),
            );
            debug!(
                container = %container.id(),
                file_name = ?container.file().upload_name(),
                file_type = container.file_type(),
                valid = container.is_valid(),
                "Queued dropped file"
            );
            collection.add(container);
        }

        self.event_bus.emit_lossy(StudioEvent::FilesDropped {
            count,
            timestamp: chrono::Utc::now(),
        });
        self.deferred.push_back(DeferredTask::FinishDrop);
    }

    /// Run work queued for the next scheduler turn
    ///
    /// Returns the number of tasks run.
    pub fn run_deferred(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.deferred.pop_front() {
            match task {
                DeferredTask::FinishDrop => {
                    self.view.hide_progress();
                    self.refresh_panel();
                }
            }
            ran += 1;
        }
        ran
    }

    /// Remove a queued file; re-enables dropping once the queue is empty
    pub fn remove_file_container(&mut self, id: ContainerId) {
        let Some(collection) = self.collection.as_mut() else {
            return;
        };
        if collection.remove(id).is_some() {
            debug!(container = %id, "Removed queued file");
            self.view.remove_container(id);
        }
        if collection.is_empty() {
            self.drop_state = DropState::DropEnabled;
        }
        self.refresh_panel();
    }

    /// Show or hide the drop area and render containers not yet rendered
    fn refresh_panel(&mut self) {
        self.view
            .set_drop_area_visible(self.drop_state == DropState::DropEnabled);

        if let Some(collection) = self.collection.as_mut() {
            for container in collection.iter_mut() {
                if !container.is_rendered() {
                    self.view.render_container(container);
                    container.mark_rendered();
                }
            }
        }
    }

    /// Start one upload per queued file, then close the dialog
    ///
    /// Does not wait for the uploads: each reports its own completion to the
    /// notifier. The returned handles resolve when each upload finishes.
    pub fn submit(&mut self) -> StudioResult<Vec<JoinHandle<UploadOutcome>>> {
        if self.upload_disabled() {
            debug!(queued = self.len(), "Submit blocked: need exactly one valid file");
            return Err(StudioError::ValidationBlocked(format!(
                "exactly one {} file is required",
                self.settings.accepted_file_type
            )));
        }

        let files: Vec<FileBlob> = self.containers().map(|c| c.file().clone()).collect();
        info!(count = files.len(), url = %self.settings.upload_url, "Submitting import");

        let handles = files
            .into_iter()
            .map(|file| {
                let request = UploadRequest {
                    url: self.settings.upload_url.clone(),
                    file,
                    headers: self.settings.headers.clone(),
                    content_name: self.settings.content_name.clone(),
                };
                tokio::spawn(upload_and_report(
                    Arc::clone(&self.transport),
                    Arc::clone(&self.notifier),
                    self.event_bus.clone(),
                    request,
                ))
            })
            .collect();

        self.close();
        Ok(handles)
    }

    /// Close the dialog; in-flight uploads are not cancelled
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.view.close();
        }
    }
}

/// Upload one file and report the completion to the operator
async fn upload_and_report(
    transport: Arc<dyn UploadTransport>,
    notifier: Arc<dyn Notifier>,
    event_bus: EventBus,
    request: UploadRequest,
) -> UploadOutcome {
    let file_name = request.file.upload_name().map(str::to_string);
    event_bus.emit_lossy(StudioEvent::UploadStarted {
        file_name: file_name.clone(),
        url: request.url.to_string(),
        timestamp: chrono::Utc::now(),
    });

    let result = transport
        .upload(request)
        .await
        .and_then(|response| response.into_result().map_err(StudioError::from));

    match result {
        Ok(response) => {
            info!(file_name = ?file_name, status = response.status, "Import upload succeeded");
            notifier.show_info(labels::IMPORT_STATUS_TITLE, labels::IMPORT_SUCCESS_TEXT);
            event_bus.emit_lossy(StudioEvent::UploadSucceeded {
                file_name: file_name.clone(),
                status: response.status,
                timestamp: chrono::Utc::now(),
            });
            UploadOutcome::Succeeded {
                file_name,
                status: response.status,
            }
        }
        Err(error) => {
            let (status, message) = match &error {
                StudioError::Remote(remote) => (Some(remote.status), remote.message.clone()),
                other => (None, other.to_string()),
            };
            warn!(file_name = ?file_name, status = ?status, error = %message, "Import upload failed");
            notifier.show_error(
                labels::IMPORT_STATUS_TITLE,
                &format!("{}{}", labels::IMPORT_FAILED_PREFIX, message),
            );
            event_bus.emit_lossy(StudioEvent::UploadFailed {
                file_name: file_name.clone(),
                status,
                message,
                timestamp: chrono::Utc::now(),
            });
            UploadOutcome::Failed { file_name, error }
        }
    }
}
