//! Section structure over a flat paragraph stream.
//!
//! # Responsibility
//! - Classify paragraphs as headings from style and run metadata.
//! - Resolve section paths to paragraph ranges.
//!
//! # Invariants
//! - Classification is a pure function over paragraph metadata.
//! - Resolved ranges never cross into a different top-level section.

pub mod classifier;
pub mod locator;
