//! `word/styles.xml` lookup and repair.
//!
//! # Responsibility
//! - Map paragraph style ids to display names.
//! - Inject minimal definitions for referenced but undefined paragraph styles.
//!
//! # Invariants
//! - Repair never removes or rewrites existing style definitions.
//! - A referenced style with no styles part at all is reported, not invented.

use super::{DocumentError, DocumentResult};
use log::warn;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

const DEFAULT_PARAGRAPH_STYLE: &str = "Normal";

/// Parsed paragraph style table of one package.
#[derive(Debug, Clone, Default)]
pub(crate) struct StyleSheet {
    xml: Option<String>,
    names: HashMap<String, String>,
    default_name: Option<String>,
    dirty: bool,
}

impl StyleSheet {
    pub(crate) fn parse(xml: Option<String>) -> DocumentResult<Self> {
        let Some(xml) = xml else {
            return Ok(Self::default());
        };

        let mut names = HashMap::new();
        let mut default_name = None;
        let mut reader = Reader::from_str(&xml);
        let mut current: Option<(String, bool)> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|err| DocumentError::Malformed(format!("styles part: {err}")))?;
            match event {
                Event::Start(start) if start.name().as_ref() == b"w:style" => {
                    current = paragraph_style_id(&start)
                        .map(|id| (id, attribute_value(&start, b"w:default").is_some()));
                }
                Event::Empty(start) if start.name().as_ref() == b"w:name" => {
                    if let (Some((id, is_default)), Some(name)) =
                        (current.as_ref(), attribute_value(&start, b"w:val"))
                    {
                        let name = display_name(&name);
                        if *is_default {
                            default_name = Some(name.clone());
                        }
                        names.insert(id.clone(), name);
                    }
                }
                Event::End(end) if end.name().as_ref() == b"w:style" => current = None,
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self {
            xml: Some(xml),
            names,
            default_name,
            dirty: false,
        })
    }

    /// Display name for a paragraph style id, falling back to the id itself.
    pub(crate) fn name_for(&self, style_id: Option<&str>) -> String {
        match style_id {
            Some(id) => self
                .names
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.to_string()),
            None => self
                .default_name
                .clone()
                .unwrap_or_else(|| DEFAULT_PARAGRAPH_STYLE.to_string()),
        }
    }

    /// Injects definitions for every id in `referenced` that is not defined.
    ///
    /// Returns the ids that were repaired.
    pub(crate) fn repair<'a, I>(&mut self, referenced: I) -> DocumentResult<Vec<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut missing = Vec::new();
        for id in referenced {
            if !self.names.contains_key(id) && !missing.iter().any(|known: &String| known == id) {
                missing.push(id.to_string());
            }
        }
        if missing.is_empty() {
            return Ok(missing);
        }

        let Some(xml) = self.xml.as_mut() else {
            return Err(DocumentError::Malformed(format!(
                "paragraph styles {missing:?} are referenced but the package has no styles part"
            )));
        };
        let Some(close_at) = xml.rfind("</w:styles>") else {
            return Err(DocumentError::Malformed(
                "styles part has no closing `w:styles` element".to_string(),
            ));
        };

        let injected = missing
            .iter()
            .map(|id| {
                let id = escape(id.as_str());
                format!(
                    "<w:style w:type=\"paragraph\" w:customStyle=\"1\" w:styleId=\"{id}\">\
                     <w:name w:val=\"{id}\"/><w:basedOn w:val=\"Normal\"/><w:qFormat/></w:style>"
                )
            })
            .collect::<String>();
        xml.insert_str(close_at, &injected);

        for id in &missing {
            warn!("event=style_repair module=document status=ok style_id={id}");
            self.names.insert(id.clone(), id.clone());
        }
        self.dirty = true;
        Ok(missing)
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn xml(&self) -> Option<&str> {
        self.xml.as_deref()
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

fn paragraph_style_id(start: &BytesStart<'_>) -> Option<String> {
    match attribute_value(start, b"w:type").as_deref() {
        Some("paragraph") => attribute_value(start, b"w:styleId"),
        _ => None,
    }
}

/// Reads one raw attribute value by qualified name.
pub(crate) fn attribute_value(start: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    start
        .attributes()
        .flatten()
        .find(|attribute| attribute.key.as_ref() == key)
        .map(|attribute| String::from_utf8_lossy(&attribute.value).into_owned())
}

/// Built-in styles are stored lowercase (`heading 1`); editors show them capitalized.
fn display_name(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            first.to_ascii_uppercase().to_string() + chars.as_str()
        }
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::StyleSheet;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
<w:style w:type="character" w:styleId="Strong"><w:name w:val="Strong"/></w:style>
</w:styles>"#;

    #[test]
    fn parse_maps_ids_to_display_names() {
        let styles = StyleSheet::parse(Some(STYLES.to_string())).unwrap();
        assert_eq!(styles.name_for(Some("Heading1")), "Heading 1");
        assert_eq!(styles.name_for(None), "Normal");
        assert_eq!(styles.name_for(Some("Unknown")), "Unknown");
        assert_eq!(styles.name_for(Some("Strong")), "Strong");
    }

    #[test]
    fn repair_injects_missing_paragraph_styles_once() {
        let mut styles = StyleSheet::parse(Some(STYLES.to_string())).unwrap();
        let repaired = styles
            .repair(["Heading1", "ListBullet", "ListBullet"])
            .unwrap();
        assert_eq!(repaired, vec!["ListBullet".to_string()]);
        assert!(styles.is_dirty());
        let xml = styles.xml().unwrap();
        assert_eq!(xml.matches("w:styleId=\"ListBullet\"").count(), 1);

        let reparsed = StyleSheet::parse(Some(xml.to_string())).unwrap();
        assert_eq!(reparsed.name_for(Some("ListBullet")), "ListBullet");
    }

    #[test]
    fn repair_without_styles_part_is_structural_error() {
        let mut styles = StyleSheet::parse(None).unwrap();
        assert!(styles.repair(["Heading1"]).is_err());
        assert!(styles.repair(std::iter::empty()).unwrap().is_empty());
    }
}
