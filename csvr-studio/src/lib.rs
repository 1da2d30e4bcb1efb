//! csvr-studio library interface
//!
//! Client-side core of the CSV import/export studio integration:
//! - [`import`]: drag-and-drop upload dialog, validity gating, multipart transport
//! - [`export`]: request building, background export job, export dialog and actions
//! - [`jobs`]: background job tracking
//!
//! Dialog widgets, navigation and message boxes are supplied by the embedding
//! UI through the traits in [`ui`].

pub mod error;
pub mod export;
pub mod import;
pub mod jobs;
pub mod remote;
pub mod ui;

pub use crate::error::{StudioError, StudioResult};
pub use crate::remote::{CsrfTokenSource, RemoteError, RemoteService, StaticCsrfToken};
