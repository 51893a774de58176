//! In-place entry rewrites and removals.
//!
//! Callers pass the paragraph index they believe holds the entry; it is used
//! as given. Resolving a live index is the caller's job.

use super::{strip_bullet, EditError};
use crate::document::Document;
use crate::model::paragraph::{render_entry_text, ParagraphFormat};
use log::debug;

/// Rewrites the paragraph at `paragraph_index` as `• new_text` and saves.
///
/// Returns the previous text with any leading marker stripped.
pub fn update_entry_text<D: Document>(
    document: &mut D,
    paragraph_index: usize,
    new_text: &str,
) -> Result<String, EditError> {
    let previous = strip_bullet(&document.paragraph(paragraph_index)?.text).to_string();
    document.replace_paragraph(
        paragraph_index,
        &render_entry_text(new_text),
        ParagraphFormat::entry(),
    )?;
    document.save()?;
    debug!("event=entry_update module=editor status=ok paragraph_index={paragraph_index}");
    Ok(previous)
}

/// Removes the paragraph at `paragraph_index` and saves.
///
/// Returns the removed text with any leading marker stripped.
pub fn remove_entry_paragraph<D: Document>(
    document: &mut D,
    paragraph_index: usize,
) -> Result<String, EditError> {
    let removed = strip_bullet(&document.paragraph(paragraph_index)?.text).to_string();
    document.remove_paragraph(paragraph_index)?;
    document.save()?;
    debug!("event=entry_remove module=editor status=ok paragraph_index={paragraph_index}");
    Ok(removed)
}
