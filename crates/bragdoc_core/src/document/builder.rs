//! Minimal `.docx` package writer.
//!
//! # Responsibility
//! - Produce valid packages for templates and fixtures without an external editor.
//!
//! # Invariants
//! - Output always contains content types, package relationships, the main
//!   document part and (unless every style is skipped) a styles part.

use super::docx::{DOCUMENT_PART, STYLES_PART};
use super::{DocumentError, DocumentResult};
use quick_xml::escape::escape;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
    r#"</Types>"#
);

const PACKAGE_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#
);

const DOCUMENT_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"</Relationships>"#
);

const SECTION_PROPERTIES_XML: &str = concat!(
    r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/>"#,
    r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/>"#,
    r#"</w:sectPr>"#
);

/// Built-in paragraph styles written to every package: `(style id, stored name)`.
const BUILTIN_STYLES: &[(&str, &str)] = &[
    ("Normal", "Normal"),
    ("Title", "Title"),
    ("Heading1", "heading 1"),
    ("Heading2", "heading 2"),
    ("Heading3", "heading 3"),
];

#[derive(Debug, Clone)]
struct BuilderParagraph {
    style_id: Option<String>,
    text: String,
    bold: bool,
}

/// Fluent builder for small `.docx` packages.
#[derive(Debug, Clone, Default)]
pub struct DocxBuilder {
    paragraphs: Vec<BuilderParagraph>,
    skipped_styles: Vec<String>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `Title` styled paragraph.
    pub fn title(self, text: impl Into<String>) -> Self {
        self.styled("Title", text)
    }

    /// Adds a `Heading{level}` styled paragraph.
    pub fn heading(self, level: u8, text: impl Into<String>) -> Self {
        self.styled(&format!("Heading{level}"), text)
    }

    /// Adds a paragraph with an explicit style id.
    pub fn styled(mut self, style_id: &str, text: impl Into<String>) -> Self {
        self.paragraphs.push(BuilderParagraph {
            style_id: Some(style_id.to_string()),
            text: text.into(),
            bold: false,
        });
        self
    }

    /// Adds an unstyled paragraph whose single run is bold.
    pub fn bold(mut self, text: impl Into<String>) -> Self {
        self.paragraphs.push(BuilderParagraph {
            style_id: None,
            text: text.into(),
            bold: true,
        });
        self
    }

    /// Adds an unstyled plain paragraph.
    pub fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.paragraphs.push(BuilderParagraph {
            style_id: None,
            text: text.into(),
            bold: false,
        });
        self
    }

    /// Omits a built-in style definition from the styles part.
    pub fn without_style(mut self, style_id: &str) -> Self {
        self.skipped_styles.push(style_id.to_string());
        self
    }

    /// Writes the package to `path`, replacing any existing file.
    pub fn write(&self, path: impl AsRef<Path>) -> DocumentResult<()> {
        let path = path.as_ref();
        let io_error = |source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_error)?;
        let mut writer = ZipWriter::new(file);
        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
            ("_rels/.rels", PACKAGE_RELS_XML.to_string()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.to_string()),
            (DOCUMENT_PART, self.document_xml()),
            (STYLES_PART, self.styles_xml()),
        ];
        for (name, content) in parts {
            writer.start_file(
                name,
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            )?;
            writer.write_all(content.as_bytes()).map_err(io_error)?;
        }
        writer.finish()?;
        Ok(())
    }

    fn document_xml(&self) -> String {
        let body = self
            .paragraphs
            .iter()
            .map(|paragraph| {
                let properties = paragraph
                    .style_id
                    .as_deref()
                    .map(|id| format!("<w:pPr><w:pStyle w:val=\"{}\"/></w:pPr>", escape(id)))
                    .unwrap_or_default();
                let run_properties = if paragraph.bold {
                    "<w:rPr><w:b/></w:rPr>"
                } else {
                    ""
                };
                if paragraph.text.is_empty() {
                    format!("<w:p>{properties}</w:p>")
                } else {
                    format!(
                        "<w:p>{properties}<w:r>{run_properties}<w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
                        escape(paragraph.text.as_str())
                    )
                }
            })
            .collect::<String>();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"{WORDML_NS}\"><w:body>{body}{SECTION_PROPERTIES_XML}</w:body></w:document>"
        )
    }

    fn styles_xml(&self) -> String {
        let styles = BUILTIN_STYLES
            .iter()
            .filter(|(id, _)| !self.skipped_styles.iter().any(|skipped| skipped == id))
            .map(|(id, name)| {
                let default = if *id == "Normal" {
                    " w:default=\"1\""
                } else {
                    ""
                };
                let heading = if id.starts_with("Heading") {
                    "<w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/><w:qFormat/>\
                     <w:rPr><w:b/></w:rPr>"
                } else {
                    "<w:qFormat/>"
                };
                format!(
                    "<w:style w:type=\"paragraph\"{default} w:styleId=\"{id}\"><w:name w:val=\"{name}\"/>{heading}</w:style>"
                )
            })
            .collect::<String>();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:styles xmlns:w=\"{WORDML_NS}\">{styles}</w:styles>"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::DocxBuilder;
    use crate::document::{Document, DocxDocument};

    #[test]
    fn written_package_reopens_with_styles_and_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.docx");
        DocxBuilder::new()
            .title("Title text")
            .heading(1, "Projects")
            .bold("Bold line")
            .paragraph("plain & simple")
            .paragraph("")
            .write(&path)
            .unwrap();

        let document = DocxDocument::open(&path).unwrap();
        let paragraphs = document.paragraphs();
        assert_eq!(paragraphs.len(), 5);
        assert_eq!(paragraphs[0].style_name.as_deref(), Some("Title"));
        assert_eq!(paragraphs[1].style_name.as_deref(), Some("Heading 1"));
        assert!(paragraphs[2].runs[0].bold);
        assert_eq!(paragraphs[3].text, "plain & simple");
        assert_eq!(paragraphs[3].style_name.as_deref(), Some("Normal"));
        assert!(paragraphs[4].is_blank());
    }
}
