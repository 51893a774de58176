//! Side-car index repository contract and JSON file implementation.

use crate::model::entry::DocumentIndex;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

pub type IndexRepoResult<T> = Result<T, IndexRepoError>;

/// Errors from index persistence.
#[derive(Debug)]
pub enum IndexRepoError {
    /// Index file does not exist.
    NotFound(PathBuf),
    /// Filesystem failure.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// File exists but is not a valid index.
    InvalidData {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for IndexRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "index not found: {}", path.display()),
            Self::Io { path, source } => {
                write!(f, "index I/O error on {}: {source}", path.display())
            }
            Self::InvalidData { path, source } => {
                write!(f, "invalid index data in {}: {source}", path.display())
            }
        }
    }
}

impl Error for IndexRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::InvalidData { source, .. } => Some(source),
        }
    }
}

/// Repository interface for side-car index files.
pub trait IndexRepository {
    /// Returns whether an index exists at `path`.
    fn exists(&self, path: &Path) -> bool;
    /// Loads an existing index.
    fn load(&self, path: &Path) -> IndexRepoResult<DocumentIndex>;
    /// Persists `index`, replacing any previous content.
    fn save(&self, path: &Path, index: &DocumentIndex) -> IndexRepoResult<()>;

    /// Creates an empty index named after the file stem when none exists.
    ///
    /// Returns `true` when a new index was written.
    fn ensure(&self, path: &Path) -> IndexRepoResult<bool> {
        if self.exists(path) {
            return Ok(false);
        }
        let document_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.save(path, &DocumentIndex::new(document_name))?;
        Ok(true)
    }
}

/// Pretty-printed JSON files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonIndexRepository;

impl JsonIndexRepository {
    pub fn new() -> Self {
        Self
    }
}

impl IndexRepository for JsonIndexRepository {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn load(&self, path: &Path) -> IndexRepoResult<DocumentIndex> {
        if !path.exists() {
            return Err(IndexRepoError::NotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path).map_err(|source| IndexRepoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| {
            error!(
                "event=index_load module=repo status=error error_code=index_malformed path={}",
                path.display()
            );
            IndexRepoError::InvalidData {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    fn save(&self, path: &Path, index: &DocumentIndex) -> IndexRepoResult<()> {
        let io_error = |source| IndexRepoError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(index).map_err(|source| {
            IndexRepoError::InvalidData {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(io_error)?;
        fs::rename(&staging, path).map_err(io_error)?;
        info!(
            "event=index_save module=repo status=ok entries={} sections={}",
            index.entries.len(),
            index.sections.len()
        );
        Ok(())
    }
}
