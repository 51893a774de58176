//! Brag document use cases.
//!
//! # Responsibility
//! - Orchestrate the document, the engines and the index repository per operation.
//! - Map every lower-layer failure into one error taxonomy.

pub mod brag_service;
pub mod error;
mod locks;
pub mod template;

pub use brag_service::{
    AddedEntry, BragService, CreateOutcome, CreateStatus, DocumentOutline, EntryTarget,
    RemovedEntry, TemplateOutcome, UpdatedEntry,
};
pub use error::{BragError, BragResult};
