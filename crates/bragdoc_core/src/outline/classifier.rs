//! Heading heuristics.
//!
//! Rules apply in order and stop at the first match:
//! 1. blank text is never a heading;
//! 2. a style name starting with `Heading` is a heading;
//! 3. a paragraph whose non-empty runs are all bold is a heading;
//! 4. short text (< 100 chars) whose first run is bold is a heading.
//!
//! Ad-hoc bold body text is classified as a heading; that false positive is accepted.

use crate::model::paragraph::Paragraph;

const HEADING_STYLE_PREFIX: &str = "Heading";
const SHORT_HEADING_MAX_CHARS: usize = 100;

/// Returns whether `paragraph` looks like a section heading.
pub fn is_heading(paragraph: &Paragraph) -> bool {
    if paragraph.is_blank() {
        return false;
    }

    if paragraph
        .style_name
        .as_deref()
        .is_some_and(|name| name.starts_with(HEADING_STYLE_PREFIX))
    {
        return true;
    }

    let mut non_empty_runs = paragraph
        .runs
        .iter()
        .filter(|run| !run.text.trim().is_empty())
        .peekable();
    if non_empty_runs.peek().is_some() && non_empty_runs.all(|run| run.bold) {
        return true;
    }

    paragraph.text.chars().count() < SHORT_HEADING_MAX_CHARS
        && paragraph.runs.first().is_some_and(|run| run.bold)
}

/// Heading paragraph summary used by outline listings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HeadingInfo {
    pub index: usize,
    pub text: String,
}

/// Lists every heading paragraph in document order.
pub fn list_headings(paragraphs: &[Paragraph]) -> Vec<HeadingInfo> {
    paragraphs
        .iter()
        .filter(|paragraph| is_heading(paragraph))
        .map(|paragraph| HeadingInfo {
            index: paragraph.index,
            text: paragraph.text.trim().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{is_heading, list_headings};
    use crate::model::paragraph::{Paragraph, Run};

    fn paragraph(style: Option<&str>, runs: Vec<Run>) -> Paragraph {
        Paragraph::from_runs(0, style.map(str::to_string), runs)
    }

    #[test]
    fn blank_text_is_never_heading() {
        let blank = paragraph(Some("Heading 1"), vec![Run::new("   ", true)]);
        assert!(!is_heading(&blank));
    }

    #[test]
    fn heading_style_prefix_wins() {
        let styled = paragraph(Some("Heading 2"), vec![Run::new("Articles", false)]);
        assert!(is_heading(&styled));
        let custom = paragraph(Some("Heading1"), vec![Run::new("Projects", false)]);
        assert!(is_heading(&custom));
    }

    #[test]
    fn all_bold_non_empty_runs_is_heading_regardless_of_length() {
        let long = "x".repeat(150);
        let all_bold = paragraph(
            Some("Normal"),
            vec![
                Run::new(long.as_str(), true),
                Run::new(" ", false),
                Run::new("tail", true),
            ],
        );
        assert!(is_heading(&all_bold));
    }

    #[test]
    fn short_text_with_bold_first_run_is_heading() {
        let mixed = paragraph(
            Some("Normal"),
            vec![Run::new("Projects", true), Run::new(" (ongoing)", false)],
        );
        assert!(is_heading(&mixed));
    }

    #[test]
    fn long_text_with_bold_first_run_only_is_not_heading() {
        let long = "y".repeat(120);
        let mixed = paragraph(
            Some("Normal"),
            vec![Run::new("Lead:", true), Run::new(long.as_str(), false)],
        );
        assert!(!is_heading(&mixed));
    }

    #[test]
    fn plain_body_text_is_not_heading() {
        let body = paragraph(Some("Normal"), vec![Run::new("• Shipped X", false)]);
        assert!(!is_heading(&body));
    }

    #[test]
    fn list_headings_reports_indices_in_order() {
        let paragraphs = vec![
            Paragraph::from_runs(0, Some("Heading 1".to_string()), vec![Run::new("Projects", false)]),
            Paragraph::from_runs(1, None, vec![Run::new("• a", false)]),
            Paragraph::from_runs(2, None, vec![Run::new("Talks", true)]),
        ];
        let headings = list_headings(&paragraphs);
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].index, 0);
        assert_eq!(headings[1].text, "Talks");
    }
}
