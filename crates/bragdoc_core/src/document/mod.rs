//! Document collaborator contract and implementations.
//!
//! # Responsibility
//! - Expose an ordered paragraph list with heading signals.
//! - Provide the structural edits the engines need: insert-before, replace, remove, save.
//! - Keep file-format repair concerns inside concrete implementations.
//!
//! # Invariants
//! - Paragraph indices are dense and renumbered after every insert/remove.
//! - Inserting at or past the paragraph count appends at the end of the body.

use crate::model::paragraph::{Paragraph, ParagraphFormat};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod builder;
mod docx;
mod memory;
mod styles;

pub use builder::DocxBuilder;
pub use docx::DocxDocument;
pub use memory::MemoryDocument;

pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors from document read/write operations.
#[derive(Debug)]
pub enum DocumentError {
    /// Document file does not exist.
    NotFound(PathBuf),
    /// Filesystem failure while reading or writing.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Package container could not be read or written.
    Package(zip::result::ZipError),
    /// Required package part is missing.
    MissingPart(&'static str),
    /// Document content cannot be parsed or repaired.
    Malformed(String),
    /// Paragraph index is outside the current document.
    ParagraphOutOfRange { index: usize, len: usize },
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "document not found: {}", path.display()),
            Self::Io { path, source } => write!(f, "I/O error on {}: {source}", path.display()),
            Self::Package(err) => write!(f, "invalid document package: {err}"),
            Self::MissingPart(part) => write!(f, "document package is missing `{part}`"),
            Self::Malformed(message) => write!(f, "malformed document: {message}"),
            Self::ParagraphOutOfRange { index, len } => write!(
                f,
                "paragraph index {index} is out of range for document with {len} paragraphs"
            ),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Package(err) => Some(err),
            _ => None,
        }
    }
}

impl From<zip::result::ZipError> for DocumentError {
    fn from(value: zip::result::ZipError) -> Self {
        Self::Package(value)
    }
}

/// Paragraph-level document access used by the section and entry engines.
pub trait Document {
    /// Current paragraphs in document order.
    fn paragraphs(&self) -> &[Paragraph];

    /// Inserts a paragraph before the one at `index`, or appends when `index`
    /// is at or past the end. Returns the index the new paragraph occupies.
    fn insert_paragraph_before(
        &mut self,
        index: usize,
        text: &str,
        format: ParagraphFormat,
    ) -> DocumentResult<usize>;

    /// Replaces the content of the paragraph at `index`.
    fn replace_paragraph(
        &mut self,
        index: usize,
        text: &str,
        format: ParagraphFormat,
    ) -> DocumentResult<()>;

    /// Removes the paragraph at `index`.
    fn remove_paragraph(&mut self, index: usize) -> DocumentResult<()>;

    /// Persists pending changes.
    fn save(&mut self) -> DocumentResult<()>;

    fn paragraph_count(&self) -> usize {
        self.paragraphs().len()
    }

    /// Returns the paragraph at `index` or an out-of-range error.
    fn paragraph(&self, index: usize) -> DocumentResult<&Paragraph> {
        let paragraphs = self.paragraphs();
        paragraphs
            .get(index)
            .ok_or(DocumentError::ParagraphOutOfRange {
                index,
                len: paragraphs.len(),
            })
    }
}
