//! Domain model for brag documents and their side-car index.
//!
//! # Responsibility
//! - Define paragraph metadata exposed by document readers.
//! - Define section paths, the fixed top-level vocabulary and resolved ranges.
//! - Define index records persisted next to each document.
//!
//! # Invariants
//! - Paragraph values are snapshots; they are never held across a mutation.
//! - Entry identifiers are generated once and never reassigned.

pub mod entry;
pub mod paragraph;
pub mod section;
