//! Entry insertion.

use super::EditError;
use crate::document::Document;
use crate::model::paragraph::{render_entry_text, Paragraph, ParagraphFormat};
use crate::model::section::{SectionPath, SectionRange};
use crate::outline::locator::try_locate;
use log::debug;

/// Paragraph index where a new entry goes inside `range`.
///
/// - `None`: one past the last non-blank paragraph, or `range.start` when the section is empty.
/// - `Some(position)`: `range.start + position`, clamped to `range.end`.
pub fn insertion_point(
    paragraphs: &[Paragraph],
    range: SectionRange,
    position: Option<usize>,
) -> usize {
    match position {
        Some(position) => range.start.saturating_add(position).min(range.end),
        None => {
            let end = range.end.min(paragraphs.len());
            let start = range.start.min(end);
            paragraphs[start..end]
                .iter()
                .rposition(|paragraph| !paragraph.is_blank())
                .map(|offset| start + offset + 1)
                .unwrap_or(range.start)
        }
    }
}

/// Inserts `text` as a bullet line into the section at `path` and saves.
///
/// Returns the paragraph index the new line occupies. Every paragraph at or
/// after that index shifts by one.
pub fn insert_entry<D: Document>(
    document: &mut D,
    path: &SectionPath,
    text: &str,
    position: Option<usize>,
) -> Result<usize, EditError> {
    let range = try_locate(document.paragraphs(), path)?;
    let point = insertion_point(document.paragraphs(), range, position);
    let index =
        document.insert_paragraph_before(point, &render_entry_text(text), ParagraphFormat::entry())?;
    document.save()?;
    debug!(
        "event=entry_insert module=editor status=ok range_start={} range_end={} paragraph_index={}",
        range.start, range.end, index
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::{insert_entry, insertion_point};
    use crate::document::{Document, MemoryDocument};
    use crate::editor::EditError;
    use crate::model::paragraph::{Paragraph, ParagraphFormat, Run};
    use crate::model::section::{SectionPath, SectionRange};
    use crate::outline::locator::{locate, LocateError};

    fn heading(text: &str) -> Paragraph {
        Paragraph::from_runs(0, Some("Heading 1".to_string()), vec![Run::new(text, false)])
    }

    fn document() -> MemoryDocument {
        MemoryDocument::new(vec![
            heading("Projects"),
            Paragraph::plain(0, "• Shipped X"),
            Paragraph::plain(0, ""),
            heading("What you learned"),
            heading("Outside of work"),
        ])
    }

    fn projects() -> SectionPath {
        SectionPath::parse("Projects").unwrap()
    }

    #[test]
    fn append_goes_after_last_non_blank_paragraph() {
        let mut document = document();
        let index = insert_entry(&mut document, &projects(), "Shipped Y", None).unwrap();
        assert_eq!(index, 2);
        assert_eq!(
            document.texts(),
            vec!["Projects", "• Shipped X", "• Shipped Y", "", "What you learned", "Outside of work"]
        );
        assert_eq!(document.format_at(2), Some(ParagraphFormat::entry()));
        assert_eq!(document.save_count(), 1);
    }

    #[test]
    fn empty_section_inserts_at_start() {
        let mut document = document();
        let path = SectionPath::parse("What you learned").unwrap();
        let index = insert_entry(&mut document, &path, "Rust", None).unwrap();
        assert_eq!(index, 4);
        assert_eq!(document.texts()[4], "• Rust");
    }

    #[test]
    fn position_zero_goes_right_after_heading() {
        let mut document = document();
        let index = insert_entry(&mut document, &projects(), "First", Some(0)).unwrap();
        assert_eq!(index, 1);
        assert_eq!(document.texts()[1], "• First");
    }

    #[test]
    fn out_of_range_position_is_clamped_to_section_end() {
        let mut document = document();
        let index = insert_entry(&mut document, &projects(), "Late", Some(99)).unwrap();
        assert_eq!(index, 3);
        let range = locate(document.paragraphs(), &projects()).unwrap();
        assert_eq!(range.end, 4);
    }

    #[test]
    fn last_section_append_lands_at_document_end() {
        let mut document = document();
        let path = SectionPath::parse("Outside of work").unwrap();
        let index = insert_entry(&mut document, &path, "Ran a marathon", None).unwrap();
        assert_eq!(index, 5);
        assert_eq!(document.paragraphs().len(), 6);
    }

    #[test]
    fn missing_section_is_reported_without_mutation() {
        let mut document = document();
        let path = SectionPath::parse("Company building").unwrap();
        let err = insert_entry(&mut document, &path, "x", None).unwrap_err();
        assert!(matches!(
            err,
            EditError::Locate(LocateError::SectionNotFound(_))
        ));
        assert_eq!(document.paragraphs().len(), 5);
        assert_eq!(document.save_count(), 0);
    }

    #[test]
    fn insertion_point_handles_empty_ranges() {
        let paragraphs = vec![Paragraph::plain(0, "x")];
        assert_eq!(insertion_point(&paragraphs, SectionRange::new(1, 1), None), 1);
        assert_eq!(insertion_point(&paragraphs, SectionRange::new(1, 1), Some(3)), 1);
    }
}
