//! Index persistence contracts and implementations.
//!
//! # Responsibility
//! - Load, create and save side-car index files.
//! - Keep JSON file details out of service orchestration.
//!
//! # Invariants
//! - Index writes are whole-file replacements.
//! - Malformed index files are reported, never silently reset.

pub mod index_repo;
