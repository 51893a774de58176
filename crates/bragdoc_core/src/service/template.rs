//! Template bootstrap and first-time document initialization.
//!
//! # Responsibility
//! - Describe the default brag document template.
//! - Turn a freshly copied template into a person's yearly document.
//!
//! # Invariants
//! - Initialization rewrites only the title line and removes example paragraphs.

use crate::config::DocumentKey;
use crate::document::{Document, DocumentResult, DocxBuilder};
use crate::model::paragraph::ParagraphFormat;
use crate::model::section::TOP_LEVEL_SECTIONS;

/// Paragraphs containing this literal are template examples.
pub const EXAMPLE_MARKER: &str = "example";

const TITLE_STYLE: &str = "Title";
const TITLE_PLACEHOLDER: &str = "Brag Document - [Full Name] ([Year])";
const NESTED_OUTSIDE_OF_WORK: &[&str] = &["Articles", "Talks", "Open source"];

/// Result of initializing a copied template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitSummary {
    pub title_index: Option<usize>,
    pub removed_examples: usize,
}

/// Default template: title placeholder, every top-level section, and one
/// example line per section.
pub fn default_template() -> DocxBuilder {
    let mut builder = DocxBuilder::new().title(TITLE_PLACEHOLDER);
    for section in TOP_LEVEL_SECTIONS {
        let heading = if *section == "Goals for next year" {
            "Goals for next year (optional)"
        } else {
            *section
        };
        builder = builder.heading(1, heading);
        if *section == "Outside of work" {
            for nested in NESTED_OUTSIDE_OF_WORK {
                builder = builder
                    .heading(2, *nested)
                    .paragraph(format!("For example: {}", nested.to_lowercase()));
            }
        } else {
            builder = builder.paragraph(format!("For example: {}", section.to_lowercase()));
        }
    }
    builder
}

/// Replaces the title placeholder and strips example paragraphs, then saves.
///
/// The title is the first non-blank `Title`-styled paragraph, or the first
/// non-blank paragraph when the template has no title style.
pub fn initialize_from_template<D: Document>(
    document: &mut D,
    key: &DocumentKey,
) -> DocumentResult<InitSummary> {
    let paragraphs = document.paragraphs();
    let title_index = paragraphs
        .iter()
        .find(|paragraph| {
            !paragraph.is_blank() && paragraph.style_name.as_deref() == Some(TITLE_STYLE)
        })
        .or_else(|| paragraphs.iter().find(|paragraph| !paragraph.is_blank()))
        .map(|paragraph| paragraph.index);

    if let Some(index) = title_index {
        document.replace_paragraph(index, &key.document_name(), ParagraphFormat::Inherit)?;
    }

    let examples = document
        .paragraphs()
        .iter()
        .filter(|paragraph| {
            Some(paragraph.index) != title_index && paragraph.text.contains(EXAMPLE_MARKER)
        })
        .map(|paragraph| paragraph.index)
        .collect::<Vec<_>>();
    for index in examples.iter().rev() {
        document.remove_paragraph(*index)?;
    }

    document.save()?;
    Ok(InitSummary {
        title_index,
        removed_examples: examples.len(),
    })
}
