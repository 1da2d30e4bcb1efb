//! CSV export dialog
//!
//! Offers the configured report templates and exports the collection view's
//! current search either directly (navigate to the export URL) or as a
//! tracked background job. Both paths are blocked until a template is
//! selected.

use std::sync::Arc;

use reqwest::Url;
use tokio::sync::watch;
use tracing::{debug, info};

use csvr_common::events::{EventBus, StudioEvent};
use csvr_common::{Computed, ValueExpression};

use super::job::ExportJobDescriptor;
use super::params::SearchParamsSource;
use super::request::ExportRequestBuilder;
use crate::error::{StudioError, StudioResult};
use crate::jobs::{JobTracker, TrackedJob};
use crate::ui::{ExportDialogView, Navigator, Notifier};

/// Collaborators an export dialog works with
#[derive(Clone)]
pub struct ExportServices {
    pub builder: ExportRequestBuilder,
    pub tracker: Arc<dyn JobTracker>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
    pub event_bus: EventBus,
}

pub struct ExportDialog {
    confirmation_message: String,
    templates: Vec<String>,
    selected_template: ValueExpression<Option<String>>,
    disabled: Computed<bool>,
    disabled_binding: ValueExpression<bool>,
    search: Arc<dyn SearchParamsSource>,
    services: ExportServices,
    view: Box<dyn ExportDialogView>,
    last_job: Option<Arc<ExportJobDescriptor>>,
    closed: bool,
}

impl ExportDialog {
    /// Open with the given template names; the first one is preselected
    pub fn open(
        confirmation_message: impl Into<String>,
        templates: Vec<String>,
        search: Arc<dyn SearchParamsSource>,
        services: ExportServices,
        view: Box<dyn ExportDialogView>,
    ) -> Self {
        let mut dialog = Self {
            confirmation_message: confirmation_message.into(),
            templates,
            selected_template: ValueExpression::new(None),
            disabled: Computed::new(),
            disabled_binding: ValueExpression::new(true),
            search,
            services,
            view,
            last_job: None,
            closed: false,
        };
        if let Some(first) = dialog.templates.first().cloned() {
            dialog.select_template(Some(first));
        }
        dialog.publish_bindings();
        dialog
    }

    pub fn confirmation_message(&self) -> &str {
        &self.confirmation_message
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    pub fn selected_template(&self) -> Option<String> {
        self.selected_template.get()
    }

    pub fn select_template(&mut self, template: Option<String>) {
        if self.selected_template.set_value(template) {
            self.disabled.invalidate();
            self.publish_bindings();
        }
    }

    /// True unless a non-empty template is selected
    pub fn is_disabled(&mut self) -> bool {
        let selected = &self.selected_template;
        self.disabled
            .get_or_compute(|| selected.get().map_or(true, |t| t.is_empty()))
    }

    /// Binding for the export buttons' `disabled` property
    pub fn disabled(&self) -> watch::Receiver<bool> {
        self.disabled_binding.subscribe()
    }

    fn publish_bindings(&mut self) {
        let disabled = self.is_disabled();
        self.disabled_binding.set_value(disabled);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The most recent background export, kept for "show result"
    pub fn last_job(&self) -> Option<&Arc<ExportJobDescriptor>> {
        self.last_job.as_ref()
    }

    fn require_template(&mut self) -> StudioResult<String> {
        if self.is_disabled() {
            return Err(StudioError::ValidationBlocked(
                "no export template selected".to_string(),
            ));
        }
        self.selected_template
            .get()
            .ok_or_else(|| StudioError::ValidationBlocked("no export template selected".to_string()))
    }

    /// Direct-export URL for the current search and template
    pub fn request_uri(&mut self) -> StudioResult<Url> {
        let template = self.require_template()?;
        let search = self.search.search_parameters();
        Ok(self.services.builder.build_url(&search, &template))
    }

    /// Navigate to the export URL and close
    pub fn handle_direct_export(&mut self) -> StudioResult<Url> {
        let url = self.request_uri()?;
        info!(url = %url, "Opening direct CSV export");
        self.services.navigator.open_url(&url);
        self.services.event_bus.emit_lossy(StudioEvent::DirectExportOpened {
            url: url.to_string(),
            timestamp: chrono::Utc::now(),
        });
        self.close();
        Ok(url)
    }

    /// Submit a background export job and close without waiting for it
    pub fn handle_background_export(&mut self) -> StudioResult<TrackedJob> {
        let template = self.require_template()?;
        let search = self.search.search_parameters();
        let params = self.services.builder.build_params(&search, &template);

        let job = Arc::new(ExportJobDescriptor::new(
            params,
            Arc::clone(&self.services.navigator),
            Arc::clone(&self.services.notifier),
        ));
        let tracked = job.submit(self.services.tracker.as_ref())?;
        self.last_job = Some(job);
        self.close();
        Ok(tracked)
    }

    /// Put the direct-export URL on the clipboard
    pub fn copy_request_uri(&mut self) -> StudioResult<()> {
        let url = self.request_uri()?;
        debug!(url = %url, "Copying export URL to clipboard");
        self.view.copy_to_clipboard(url.as_str());
        Ok(())
    }

    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.view.close();
        }
    }
}
