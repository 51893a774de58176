//! Workspace layout configuration.
//!
//! # Responsibility
//! - Carry the workspace root explicitly through every entry point.
//! - Derive document, index and template paths from a person name and year.
//!
//! # Invariants
//! - Paths are pure functions of `(root, full name, year)`.
//! - Person names never contain path separators or parent references.

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Title label used in file names and the document title line.
pub const DOCUMENT_LABEL: &str = "Brag Document";
/// Directory under the workspace root holding per-person folders.
pub const DOCUMENTS_DIR: &str = "BragDocuments";
/// Hidden directory next to documents holding index files.
pub const INDEX_DIR: &str = ".index";
/// Template location relative to the workspace root.
pub const TEMPLATE_RELATIVE_PATH: &str = "Templates/A brag document template.docx";

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;

/// Explicit workspace configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    root: PathBuf,
}

impl WorkspaceConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn template_path(&self) -> PathBuf {
        self.root.join(TEMPLATE_RELATIVE_PATH)
    }

    /// Folder holding one person's documents.
    pub fn person_dir(&self, key: &DocumentKey) -> PathBuf {
        self.root.join(DOCUMENTS_DIR).join(key.full_name())
    }

    pub fn document_path(&self, key: &DocumentKey) -> PathBuf {
        self.person_dir(key)
            .join(format!("{}.docx", key.document_name()))
    }

    pub fn index_path(&self, key: &DocumentKey) -> PathBuf {
        self.person_dir(key)
            .join(INDEX_DIR)
            .join(format!("{}.json", key.document_name()))
    }
}

/// Validation failure for a document key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    BlankName,
    UnsafeName(String),
    YearOutOfRange(i32),
}

impl Display for KeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "full name must not be blank"),
            Self::UnsafeName(name) => write!(
                f,
                "full name `{name}` must not contain path separators or `..`"
            ),
            Self::YearOutOfRange(year) => {
                write!(f, "year {year} is outside {MIN_YEAR}..={MAX_YEAR}")
            }
        }
    }
}

impl std::error::Error for KeyError {}

/// Identity of one yearly document: `(full name, year)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    full_name: String,
    year: i32,
}

impl DocumentKey {
    /// Validates and normalizes a person name and year.
    pub fn new(full_name: &str, year: i32) -> Result<Self, KeyError> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(KeyError::BlankName);
        }
        if full_name.contains(['/', '\\']) || full_name.contains("..") {
            return Err(KeyError::UnsafeName(full_name.to_string()));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(KeyError::YearOutOfRange(year));
        }
        Ok(Self {
            full_name: full_name.to_string(),
            year,
        })
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// `Brag Document - <name> (<year>)`, used for file stems and the title line.
    pub fn document_name(&self) -> String {
        format!("{DOCUMENT_LABEL} - {} ({})", self.full_name, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentKey, KeyError, WorkspaceConfig};
    use std::path::Path;

    #[test]
    fn paths_follow_workspace_layout() {
        let config = WorkspaceConfig::new("/work");
        let key = DocumentKey::new(" Jane Doe ", 2025).unwrap();
        assert_eq!(
            config.document_path(&key),
            Path::new("/work/BragDocuments/Jane Doe/Brag Document - Jane Doe (2025).docx")
        );
        assert_eq!(
            config.index_path(&key),
            Path::new("/work/BragDocuments/Jane Doe/.index/Brag Document - Jane Doe (2025).json")
        );
        assert_eq!(
            config.template_path(),
            Path::new("/work/Templates/A brag document template.docx")
        );
    }

    #[test]
    fn key_rejects_blank_unsafe_and_out_of_range_inputs() {
        assert_eq!(DocumentKey::new("  ", 2025), Err(KeyError::BlankName));
        assert!(matches!(
            DocumentKey::new("../etc", 2025),
            Err(KeyError::UnsafeName(_))
        ));
        assert!(matches!(
            DocumentKey::new("a/b", 2025),
            Err(KeyError::UnsafeName(_))
        ));
        assert_eq!(
            DocumentKey::new("Jane", 25),
            Err(KeyError::YearOutOfRange(25))
        );
    }
}
