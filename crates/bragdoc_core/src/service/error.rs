//! Service-level error taxonomy.
//!
//! Every lower-layer error converts into [`BragError`], and every variant
//! maps to a stable snake_case code for structured responses.

use crate::config::KeyError;
use crate::document::DocumentError;
use crate::editor::EditError;
use crate::index_sync::{FindEntryError, IndexSyncError};
use crate::model::entry::EntryId;
use crate::model::section::SectionPathError;
use crate::outline::locator::LocateError;
use crate::repo::index_repo::IndexRepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type BragResult<T> = Result<T, BragError>;

/// Failure of a brag document operation.
#[derive(Debug)]
pub enum BragError {
    /// Missing or unusable caller arguments.
    InvalidArgument(String),
    DocumentNotFound(PathBuf),
    IndexNotFound(PathBuf),
    TemplateNotFound(PathBuf),
    /// Section or subsection heading absent from the document.
    Locate(LocateError),
    /// Entry id absent from the index.
    EntryNotFound(EntryId),
    /// Entry is indexed but its paragraph can no longer be found in the document.
    EntryParagraphMissing(EntryId),
    ParagraphOutOfRange { index: usize, len: usize },
    FindEntry(FindEntryError),
    Document(DocumentError),
    Index(IndexRepoError),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl BragError {
    /// Stable machine-readable code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::DocumentNotFound(_) => "document_not_found",
            Self::IndexNotFound(_) => "index_not_found",
            Self::TemplateNotFound(_) => "template_not_found",
            Self::Locate(_) => "section_not_found",
            Self::EntryNotFound(_) | Self::EntryParagraphMissing(_) => "entry_not_found",
            Self::ParagraphOutOfRange { .. } => "paragraph_out_of_range",
            Self::FindEntry(FindEntryError::SectionHasNoEntries { .. }) => "section_has_no_entries",
            Self::FindEntry(FindEntryError::NoMatch { .. }) => "no_matching_entry",
            Self::FindEntry(FindEntryError::OccurrenceOutOfRange { .. }) => {
                "occurrence_out_of_range"
            }
            Self::Document(DocumentError::Io { .. }) => "io_failure",
            Self::Document(_) => "document_malformed",
            Self::Index(IndexRepoError::InvalidData { .. }) => "index_malformed",
            Self::Index(_) | Self::Io { .. } => "io_failure",
        }
    }

    /// Actionable next step for the caller, when one exists.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::DocumentNotFound(_) => {
                Some("Create the document for this name and year before adding or editing entries.")
            }
            Self::IndexNotFound(_) => {
                Some("Run create for this name and year to rebuild the missing index.")
            }
            Self::TemplateNotFound(_) => {
                Some("Run the template command to write the default template into the workspace.")
            }
            Self::Locate(_) => Some("Check the section path against the document outline."),
            Self::EntryNotFound(_) | Self::EntryParagraphMissing(_) => {
                Some("List the entries to find a current entry id.")
            }
            Self::FindEntry(_) => {
                Some("List the entries of the section to check the exact text and occurrence.")
            }
            Self::Document(DocumentError::Io { .. }) => None,
            Self::Document(_) => {
                Some("Open the document in a word processor and re-save it as .docx.")
            }
            Self::Index(IndexRepoError::InvalidData { .. }) => {
                Some("Restore the index file from a backup or remove it and run create again.")
            }
            _ => None,
        }
    }
}

impl Display for BragError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::DocumentNotFound(path) => write!(f, "document not found: {}", path.display()),
            Self::IndexNotFound(path) => write!(f, "index not found: {}", path.display()),
            Self::TemplateNotFound(path) => write!(f, "template not found: {}", path.display()),
            Self::Locate(err) => write!(f, "{err}"),
            Self::EntryNotFound(entry_id) => write!(f, "entry not found: {entry_id}"),
            Self::EntryParagraphMissing(entry_id) => {
                write!(f, "entry {entry_id} is indexed but missing from the document")
            }
            Self::ParagraphOutOfRange { index, len } => write!(
                f,
                "paragraph index {index} is out of range for a document with {len} paragraphs"
            ),
            Self::FindEntry(err) => write!(f, "{err}"),
            Self::Document(err) => write!(f, "{err}"),
            Self::Index(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "io failure at {}: {source}", path.display()),
        }
    }
}

impl Error for BragError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Locate(err) => Some(err),
            Self::FindEntry(err) => Some(err),
            Self::Document(err) => Some(err),
            Self::Index(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<KeyError> for BragError {
    fn from(value: KeyError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

impl From<SectionPathError> for BragError {
    fn from(value: SectionPathError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

impl From<LocateError> for BragError {
    fn from(value: LocateError) -> Self {
        Self::Locate(value)
    }
}

impl From<DocumentError> for BragError {
    fn from(value: DocumentError) -> Self {
        match value {
            DocumentError::NotFound(path) => Self::DocumentNotFound(path),
            DocumentError::ParagraphOutOfRange { index, len } => {
                Self::ParagraphOutOfRange { index, len }
            }
            other => Self::Document(other),
        }
    }
}

impl From<EditError> for BragError {
    fn from(value: EditError) -> Self {
        match value {
            EditError::Locate(err) => err.into(),
            EditError::Document(err) => err.into(),
        }
    }
}

impl From<IndexRepoError> for BragError {
    fn from(value: IndexRepoError) -> Self {
        match value {
            IndexRepoError::NotFound(path) => Self::IndexNotFound(path),
            other => Self::Index(other),
        }
    }
}

impl From<IndexSyncError> for BragError {
    fn from(value: IndexSyncError) -> Self {
        match value {
            IndexSyncError::EntryNotFound(entry_id) => Self::EntryNotFound(entry_id),
        }
    }
}

impl From<FindEntryError> for BragError {
    fn from(value: FindEntryError) -> Self {
        Self::FindEntry(value)
    }
}
