//! CSV export: request building, background job and dialog

pub mod actions;
pub mod dialog;
pub mod job;
pub mod params;
pub mod request;

pub use actions::{
    ContentKind, ContentRef, ExportDialogRequest, OpenExportByFolderAction,
    OpenExportContentSetAction, SearchResult,
};
pub use dialog::{ExportDialog, ExportServices};
pub use job::{ErrorHandler, ExportJobDescriptor};
pub use params::{ParamMap, ParamValue, SearchParameters, SearchParamsSource};
pub use request::{canonicalize, ExportRequest, ExportRequestBuilder};
