//! Actions that open the export dialog
//!
//! Each action decides whether it is enabled for the current selection and,
//! when handled, produces the confirmation text the dialog opens with.

use crate::ui::labels;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Folder,
    Document,
}

/// Minimal view of a repository item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRef {
    pub uri: String,
    pub name: String,
    pub path: String,
    pub kind: ContentKind,
    pub parent: Option<Box<ContentRef>>,
}

impl ContentRef {
    pub fn folder(uri: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            path: path.into(),
            kind: ContentKind::Folder,
            parent: None,
        }
    }

    pub fn document(uri: impl Into<String>, name: impl Into<String>, parent: ContentRef) -> Self {
        let name = name.into();
        let path = format!("{}/{}", parent.path.trim_end_matches('/'), name);
        Self {
            uri: uri.into(),
            name,
            path,
            kind: ContentKind::Document,
            parent: Some(Box::new(parent)),
        }
    }

    pub fn is_document(&self) -> bool {
        self.kind == ContentKind::Document
    }
}

/// What an action asks the UI to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDialogRequest {
    pub confirmation_message: String,
    /// Folder the export is scoped to, for folder exports
    pub folder: Option<ContentRef>,
}

/// "Export folder" action for the repository toolbar
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenExportByFolderAction;

impl OpenExportByFolderAction {
    /// Disabled without a selection, or for a single non-folder item
    pub fn is_disabled(&self, selection: Option<&[ContentRef]>) -> bool {
        match selection {
            None | Some([]) => true,
            Some([single]) => single.is_document(),
            Some(_) => false,
        }
    }

    /// Export the first selected folder, or the folder containing the first document
    pub fn handle(&self, selection: &[ContentRef]) -> Option<ExportDialogRequest> {
        let first = selection.first()?;
        let folder = if first.is_document() {
            first.parent.as_deref()?.clone()
        } else {
            first.clone()
        };

        // Root folder has no usable name
        let confirmation_message = if folder.name.chars().count() > 1 {
            labels::export_folder_text(&folder.name)
        } else {
            labels::EXPORT_ROOT_FOLDER_TEXT.to_string()
        };

        Some(ExportDialogRequest {
            confirmation_message,
            folder: Some(folder),
        })
    }
}

/// Search result handed to the content-set action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub hits: Option<Vec<ContentRef>>,
}

/// "Export search result" action for the collection view
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenExportContentSetAction;

impl OpenExportContentSetAction {
    /// Disabled only while there is no search result at all
    pub fn is_disabled(&self, result: Option<&SearchResult>) -> bool {
        result.is_none()
    }

    pub fn handle(&self, result: Option<&SearchResult>) -> Option<ExportDialogRequest> {
        // The export may cover more items than the hits shown, so no count in the text
        result.map(|_| ExportDialogRequest {
            confirmation_message: labels::EXPORT_SEARCH_RESULT_TEXT.to_string(),
            folder: None,
        })
    }
}
