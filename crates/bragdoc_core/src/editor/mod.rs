//! Entry-level structural edits on a document.
//!
//! # Responsibility
//! - Compute insertion points inside resolved sections and insert bullet lines.
//! - Rewrite or remove an existing entry paragraph by index.
//!
//! # Invariants
//! - Every successful edit is persisted with `Document::save` before returning.
//! - Entry lines are always rendered as `• <text>` with the fixed entry indent.

use crate::document::DocumentError;
use crate::outline::locator::LocateError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod insert;
pub mod mutate;

pub use insert::{insert_entry, insertion_point};
pub use mutate::{remove_entry_paragraph, update_entry_text};

static LEADING_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[•\-]\s*").expect("valid bullet marker regex"));

/// Errors from entry edits.
#[derive(Debug)]
pub enum EditError {
    /// Target section could not be resolved.
    Locate(LocateError),
    /// Document-level failure, including out-of-range paragraph indices.
    Document(DocumentError),
}

impl Display for EditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locate(err) => write!(f, "{err}"),
            Self::Document(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Locate(err) => Some(err),
            Self::Document(err) => Some(err),
        }
    }
}

impl From<LocateError> for EditError {
    fn from(value: LocateError) -> Self {
        Self::Locate(value)
    }
}

impl From<DocumentError> for EditError {
    fn from(value: DocumentError) -> Self {
        Self::Document(value)
    }
}

/// Strips a leading bullet glyph or legacy hyphen marker.
pub fn strip_bullet(text: &str) -> &str {
    match LEADING_MARKER_RE.find(text) {
        Some(marker) => &text[marker.end()..],
        None => text,
    }
}
