//! Core domain logic for brag documents.
//! This crate owns the section taxonomy, the entry engines and the index format.

pub mod config;
pub mod document;
pub mod editor;
pub mod index_sync;
pub mod logging;
pub mod model;
pub mod outline;
pub mod repo;
pub mod service;

pub use config::{DocumentKey, KeyError, WorkspaceConfig};
pub use document::{Document, DocumentError, DocumentResult, DocxBuilder, DocxDocument, MemoryDocument};
pub use index_sync::{FindEntryError, IndexSyncError};
pub use logging::{default_log_level, init_logging, LoggingError};
pub use model::entry::{DocumentIndex, Entry, EntryId, SectionBucket};
pub use model::section::{SectionPath, SectionRange, TOP_LEVEL_SECTIONS};
pub use outline::classifier::{is_heading, HeadingInfo};
pub use outline::locator::{locate, LocateError};
pub use repo::index_repo::{IndexRepoError, IndexRepository, JsonIndexRepository};
pub use service::{
    AddedEntry, BragError, BragResult, BragService, CreateOutcome, CreateStatus, DocumentOutline,
    EntryTarget, RemovedEntry, TemplateOutcome, UpdatedEntry,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
