//! Section path resolution.
//!
//! # Responsibility
//! - Resolve a main section (and optional nested subsection) to a paragraph range.
//!
//! # Invariants
//! - `start` is one past the matched heading.
//! - A main section ends at the nearest later heading naming another top-level
//!   section, or at the document length.
//! - A nested section ends at the next heading of any kind inside its parent range.

use super::classifier::is_heading;
use crate::model::paragraph::Paragraph;
use crate::model::section::{section_names_match, SectionPath, SectionRange, TOP_LEVEL_SECTIONS};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from section resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    /// No heading matches the main section name.
    SectionNotFound(String),
    /// The main section exists but has no heading for the nested name.
    SubsectionNotFound { section: String, subsection: String },
}

impl Display for LocateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SectionNotFound(section) => write!(f, "section not found: `{section}`"),
            Self::SubsectionNotFound {
                section,
                subsection,
            } => write!(
                f,
                "subsection `{subsection}` not found in section `{section}`"
            ),
        }
    }
}

impl Error for LocateError {}

/// Resolves `path` to the paragraph range it occupies.
pub fn locate(paragraphs: &[Paragraph], path: &SectionPath) -> Option<SectionRange> {
    try_locate(paragraphs, path).ok()
}

/// Same as [`locate`], but reports which segment failed to resolve.
pub fn try_locate(paragraphs: &[Paragraph], path: &SectionPath) -> Result<SectionRange, LocateError> {
    let heading_at = find_heading(paragraphs, 0, paragraphs.len(), |text| {
        section_names_match(text, path.main())
    })
    .ok_or_else(|| LocateError::SectionNotFound(path.main().to_string()))?;

    let section_start = heading_at + 1;
    let section_end = TOP_LEVEL_SECTIONS
        .iter()
        .filter(|name| !section_names_match(name, path.main()))
        .filter_map(|name| {
            find_heading(paragraphs, section_start, paragraphs.len(), |text| {
                section_names_match(text, name)
            })
        })
        .min()
        .unwrap_or(paragraphs.len());

    let Some(nested) = path.nested() else {
        return Ok(SectionRange::new(section_start, section_end));
    };

    let nested_at = find_heading(paragraphs, section_start, section_end, |text| text == nested)
        .ok_or_else(|| LocateError::SubsectionNotFound {
            section: path.main().to_string(),
            subsection: nested.to_string(),
        })?;
    let nested_start = nested_at + 1;
    let nested_end =
        find_heading(paragraphs, nested_start, section_end, |_| true).unwrap_or(section_end);
    Ok(SectionRange::new(nested_start, nested_end))
}

/// First heading index in `[from, to)` whose trimmed text satisfies `matches`.
fn find_heading(
    paragraphs: &[Paragraph],
    from: usize,
    to: usize,
    matches: impl Fn(&str) -> bool,
) -> Option<usize> {
    let to = to.min(paragraphs.len());
    if from >= to {
        return None;
    }
    paragraphs[from..to]
        .iter()
        .position(|paragraph| is_heading(paragraph) && matches(paragraph.text.trim()))
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::{locate, try_locate, LocateError};
    use crate::model::paragraph::{Paragraph, Run};
    use crate::model::section::SectionPath;

    fn heading(text: &str) -> Paragraph {
        Paragraph::from_runs(0, Some("Heading 1".to_string()), vec![Run::new(text, false)])
    }

    fn subheading(text: &str) -> Paragraph {
        Paragraph::from_runs(0, Some("Heading 2".to_string()), vec![Run::new(text, false)])
    }

    fn body(text: &str) -> Paragraph {
        Paragraph::plain(0, text)
    }

    fn numbered(mut paragraphs: Vec<Paragraph>) -> Vec<Paragraph> {
        for (index, paragraph) in paragraphs.iter_mut().enumerate() {
            paragraph.index = index;
        }
        paragraphs
    }

    fn sample() -> Vec<Paragraph> {
        numbered(vec![
            body("Brag Document - Jane Doe (2025)"),
            heading("Goals for this year"),
            body("• Ship X"),
            heading("Goals for next year (optional)"),
            heading("Projects"),
            body("• Shipped X"),
            body(""),
            heading("Outside of work"),
            subheading("Articles"),
            body("• Wrote guide"),
            subheading("Talks"),
            body("• RustConf"),
        ])
    }

    fn path(raw: &str) -> SectionPath {
        SectionPath::parse(raw).unwrap()
    }

    #[test]
    fn top_level_range_ends_at_next_known_section() {
        let paragraphs = sample();
        let range = locate(&paragraphs, &path("Goals for this year")).unwrap();
        assert_eq!((range.start, range.end), (2, 3));
        let projects = locate(&paragraphs, &path("Projects")).unwrap();
        assert_eq!((projects.start, projects.end), (5, 7));
    }

    #[test]
    fn last_section_ends_at_document_length() {
        let paragraphs = sample();
        let range = locate(&paragraphs, &path("Outside of work")).unwrap();
        assert_eq!((range.start, range.end), (8, paragraphs.len()));
    }

    #[test]
    fn alias_resolves_in_both_directions() {
        let paragraphs = sample();
        let canonical = locate(&paragraphs, &path("Goals for next year")).unwrap();
        let alias = locate(&paragraphs, &path("Goals for next year (optional)")).unwrap();
        assert_eq!(canonical, alias);
        assert_eq!((canonical.start, canonical.end), (4, 4));

        let mut renamed = sample();
        renamed[3] = Paragraph::from_runs(
            3,
            Some("Heading 1".to_string()),
            vec![Run::new("Goals for next year", false)],
        );
        assert!(locate(&renamed, &path("Goals for next year (optional)")).is_some());
    }

    #[test]
    fn nested_range_stops_at_sibling_subsection() {
        let paragraphs = sample();
        let articles = locate(&paragraphs, &path("Outside of work/Articles")).unwrap();
        assert_eq!((articles.start, articles.end), (9, 10));
        let talks = locate(&paragraphs, &path("Outside of work/Talks")).unwrap();
        assert_eq!((talks.start, talks.end), (11, 12));
    }

    #[test]
    fn unknown_section_and_subsection_are_distinguished() {
        let paragraphs = sample();
        assert_eq!(
            try_locate(&paragraphs, &path("Company building")),
            Err(LocateError::SectionNotFound("Company building".to_string()))
        );
        assert!(matches!(
            try_locate(&paragraphs, &path("Projects/Articles")),
            Err(LocateError::SubsectionNotFound { .. })
        ));
    }

    #[test]
    fn non_heading_text_does_not_match_section() {
        let paragraphs = numbered(vec![body("Projects"), heading("Projects"), body("• a")]);
        let range = locate(&paragraphs, &path("Projects")).unwrap();
        assert_eq!((range.start, range.end), (2, 3));
    }
}
