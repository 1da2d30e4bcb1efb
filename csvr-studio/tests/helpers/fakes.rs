//! Recording fakes for the UI collaborators, the upload transport and the
//! job runner
//!
//! Every fake keeps its history in a `watch` channel so tests can await a
//! condition instead of sleeping.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Semaphore};

use csvr_studio::import::{
    ContainerId, FileUploadContainer, RemovalHandle, UploadRequest, UploadResponse,
    UploadTransport,
};
use csvr_studio::jobs::{JobError, JobResult, JobRunner};
use csvr_studio::ui::{ExportDialogView, Navigator, Notifier, UploadDialogView};
use csvr_studio::StudioResult;
use reqwest::Url;

const WAIT_LIMIT: Duration = Duration::from_secs(5);

/// Wait until `predicate` holds for the watched history
pub async fn wait_until<T, F>(rx: &mut watch::Receiver<Vec<T>>, predicate: F)
where
    F: FnMut(&Vec<T>) -> bool,
{
    tokio::time::timeout(WAIT_LIMIT, rx.wait_for(predicate))
        .await
        .expect("timed out waiting for condition")
        .expect("history sender dropped");
}

// ========================================
// Notifier
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

pub struct RecordingNotifier {
    notices: watch::Sender<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        let (notices, _) = watch::channel(Vec::new());
        Arc::new(Self { notices })
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub async fn wait_for_count(&self, count: usize) -> Vec<Notice> {
        let mut rx = self.notices.subscribe();
        wait_until(&mut rx, |n| n.len() >= count).await;
        self.notices()
    }

    fn push(&self, kind: NoticeKind, title: &str, message: &str) {
        self.notices.send_modify(|n| {
            n.push(Notice {
                kind,
                title: title.to_string(),
                message: message.to_string(),
            })
        });
    }
}

impl Notifier for RecordingNotifier {
    fn show_info(&self, title: &str, message: &str) {
        self.push(NoticeKind::Info, title, message);
    }

    fn show_error(&self, title: &str, message: &str) {
        self.push(NoticeKind::Error, title, message);
    }
}

// ========================================
// Upload dialog view
// ========================================

#[derive(Debug, Clone)]
pub enum ViewCall {
    ShowProgress,
    HideProgress,
    DropAreaVisible(bool),
    Render {
        id: ContainerId,
        file_name: Option<String>,
        removal: RemovalHandle,
    },
    Remove(ContainerId),
    Close,
}

/// Shared history of the calls a [`RecordingView`] received
#[derive(Clone)]
pub struct ViewLog {
    calls: Arc<watch::Sender<Vec<ViewCall>>>,
}

impl ViewLog {
    pub fn new() -> Self {
        let (calls, _) = watch::channel(Vec::new());
        Self {
            calls: Arc::new(calls),
        }
    }

    pub fn view(&self) -> Box<dyn UploadDialogView> {
        Box::new(RecordingView { log: self.clone() })
    }

    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.borrow().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.calls().iter().any(|c| matches!(c, ViewCall::Close))
    }

    pub fn rendered(&self) -> Vec<(ContainerId, Option<String>, RemovalHandle)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ViewCall::Render {
                    id,
                    file_name,
                    removal,
                } => Some((id, file_name, removal)),
                _ => None,
            })
            .collect()
    }

    pub fn last_drop_area_visibility(&self) -> Option<bool> {
        self.calls().iter().rev().find_map(|c| match c {
            ViewCall::DropAreaVisible(visible) => Some(*visible),
            _ => None,
        })
    }

    pub async fn wait_for<F>(&self, predicate: F)
    where
        F: FnMut(&Vec<ViewCall>) -> bool,
    {
        let mut rx = self.calls.subscribe();
        wait_until(&mut rx, predicate).await;
    }

    fn push(&self, call: ViewCall) {
        self.calls.send_modify(|c| c.push(call));
    }
}

struct RecordingView {
    log: ViewLog,
}

impl UploadDialogView for RecordingView {
    fn show_progress(&mut self, _title: &str, _message: &str) {
        self.log.push(ViewCall::ShowProgress);
    }

    fn hide_progress(&mut self) {
        self.log.push(ViewCall::HideProgress);
    }

    fn set_drop_area_visible(&mut self, visible: bool) {
        self.log.push(ViewCall::DropAreaVisible(visible));
    }

    fn render_container(&mut self, container: &FileUploadContainer) {
        self.log.push(ViewCall::Render {
            id: container.id(),
            file_name: container.file().upload_name().map(str::to_string),
            removal: container.removal_handle(),
        });
    }

    fn remove_container(&mut self, id: ContainerId) {
        self.log.push(ViewCall::Remove(id));
    }

    fn close(&mut self) {
        self.log.push(ViewCall::Close);
    }
}

// ========================================
// Upload transport
// ========================================

/// Transport whose uploads block until the test opens the gate
pub struct GatedTransport {
    gate: Semaphore,
    requests: watch::Sender<Vec<UploadRequest>>,
    outcomes: Mutex<VecDeque<StudioResult<UploadResponse>>>,
}

impl GatedTransport {
    pub fn new() -> Arc<Self> {
        let (requests, _) = watch::channel(Vec::new());
        Arc::new(Self {
            gate: Semaphore::new(0),
            requests,
            outcomes: Mutex::new(VecDeque::new()),
        })
    }

    /// Queue the next outcome; unscripted uploads answer 204
    pub fn respond_with(&self, outcome: StudioResult<UploadResponse>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// Let `count` pending or future uploads complete
    pub fn release(&self, count: usize) {
        self.gate.add_permits(count);
    }

    pub fn requests(&self) -> Vec<UploadRequest> {
        self.requests.borrow().clone()
    }

    pub async fn wait_for_requests(&self, count: usize) -> Vec<UploadRequest> {
        let mut rx = self.requests.subscribe();
        wait_until(&mut rx, |r| r.len() >= count).await;
        self.requests()
    }
}

pub fn response(status: u16, body: &str) -> UploadResponse {
    UploadResponse {
        status,
        status_text: String::new(),
        body: body.to_string(),
    }
}

#[async_trait]
impl UploadTransport for GatedTransport {
    async fn upload(&self, request: UploadRequest) -> StudioResult<UploadResponse> {
        self.requests.send_modify(|r| r.push(request));
        self.gate
            .acquire()
            .await
            .expect("gate closed")
            .forget();

        let scripted = self.outcomes.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(response(204, "")))
    }
}

// ========================================
// Navigation and export view
// ========================================

#[derive(Default)]
pub struct RecordingNavigator {
    pub opened: Mutex<Vec<Url>>,
    pub shown: Mutex<Vec<JobResult>>,
}

impl Navigator for RecordingNavigator {
    fn open_url(&self, url: &Url) {
        self.opened.lock().unwrap().push(url.clone());
    }

    fn show_in_repository(&self, result: &JobResult) {
        self.shown.lock().unwrap().push(result.clone());
    }
}

#[derive(Clone, Default)]
pub struct ExportViewLog {
    pub closed: Arc<Mutex<usize>>,
    pub clipboard: Arc<Mutex<Vec<String>>>,
}

impl ExportViewLog {
    pub fn view(&self) -> Box<dyn ExportDialogView> {
        Box::new(self.clone())
    }
}

impl ExportDialogView for ExportViewLog {
    fn close(&mut self) {
        *self.closed.lock().unwrap() += 1;
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        self.clipboard.lock().unwrap().push(text.to_string());
    }
}

// ========================================
// Job runner
// ========================================

/// Records submitted jobs and answers from a script
pub struct RecordingRunner {
    pub submissions: Mutex<Vec<(String, serde_json::Value)>>,
    outcomes: Mutex<VecDeque<Result<JobResult, JobError>>>,
}

impl RecordingRunner {
    pub fn new(outcomes: Vec<Result<JobResult, JobError>>) -> Arc<Self> {
        Arc::new(Self {
            submissions: Mutex::new(Vec::new()),
            outcomes: Mutex::new(outcomes.into()),
        })
    }
}

#[async_trait]
impl JobRunner for RecordingRunner {
    async fn run(&self, job_type: &str, params: serde_json::Value) -> Result<JobResult, JobError> {
        self.submissions
            .lock()
            .unwrap()
            .push((job_type.to_string(), params));
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(JobResult::new(serde_json::Value::Null)))
    }
}
