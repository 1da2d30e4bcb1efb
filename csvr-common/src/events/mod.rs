//! Event types for the csvr event system
//!
//! Provides the shared event definitions and the EventBus used by the import
//! session, the export dialog and the job tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// csvr event types
///
/// Events are broadcast via EventBus and serialise with a `type` tag so they
/// can be forwarded to a UI or an audit log unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StudioEvent {
    /// Files were accepted by the import drop target
    FilesDropped {
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A file upload request was issued
    UploadStarted {
        file_name: Option<String>,
        url: String,
        timestamp: DateTime<Utc>,
    },

    /// Upload finished with a success status (200, 201, 204)
    UploadSucceeded {
        file_name: Option<String>,
        status: u16,
        timestamp: DateTime<Utc>,
    },

    /// Upload failed, either with an error status or without any response
    UploadFailed {
        file_name: Option<String>,
        /// None when no HTTP response was received
        status: Option<u16>,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Direct export URL handed to the navigator
    DirectExportOpened {
        url: String,
        timestamp: DateTime<Utc>,
    },

    /// Background job accepted by the tracker
    JobSubmitted {
        job_id: Uuid,
        job_type: String,
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// Background job finished successfully
    JobSucceeded {
        job_id: Uuid,
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// Background job failed (terminal; retries already exhausted or not allowed)
    JobFailed {
        job_id: Uuid,
        name: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use csvr_common::events::{EventBus, StudioEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(StudioEvent::FilesDropped {
///     count: 1,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(StudioEvent::FilesDropped { count: 1, .. })));
/// ```
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<StudioEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: StudioEvent,
    ) -> Result<usize, broadcast::error::SendError<StudioEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: StudioEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
