//! DOCX styles parsing.

use crate::error::{Error, Result};
use crate::model::{HeadingLevel, ParagraphStyle};
use std::collections::HashMap;

/// Style type (paragraph, character, table, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleType {
    Paragraph,
    Character,
    Table,
    Numbering,
}

/// A parsed style definition.
#[derive(Debug, Clone, Default)]
pub struct Style {
    /// Style ID (e.g., "Heading1")
    pub id: String,
    /// Style name (e.g., "heading 1")
    pub name: String,
    /// Style type
    pub style_type: Option<StyleType>,
    /// Based on another style
    pub based_on: Option<String>,
    /// Outline level (for headings)
    pub outline_level: Option<u8>,
    /// Explicit `w:pageBreakBefore`, if any
    pub page_break_before: Option<bool>,
}

impl Style {
    /// Display name, falling back to the ID for unnamed styles.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Collection of styles from styles.xml.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    /// Styles by ID
    pub styles: HashMap<String, Style>,
    /// Paragraph style IDs in definition order
    pub paragraph_order: Vec<String>,
    /// Default paragraph style
    pub default_paragraph: Option<String>,
}

impl StyleMap {
    /// Parse styles from XML content.
    pub fn parse(xml: &str) -> Result<Self> {
        if xml.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut map = StyleMap::default();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut current: Option<(Style, bool)> = None;
        let mut in_ppr = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(e)) => match e.name().as_ref() {
                    b"w:style" => {
                        let mut style = Style::default();
                        let mut is_default = false;
                        for attr in e.attributes().flatten() {
                            let value = String::from_utf8_lossy(&attr.value);
                            match attr.key.as_ref() {
                                b"w:styleId" => style.id = value.to_string(),
                                b"w:type" => {
                                    style.style_type = match value.as_ref() {
                                        "paragraph" => Some(StyleType::Paragraph),
                                        "character" => Some(StyleType::Character),
                                        "table" => Some(StyleType::Table),
                                        "numbering" => Some(StyleType::Numbering),
                                        _ => None,
                                    };
                                }
                                b"w:default" => is_default = value == "1" || value == "true",
                                _ => {}
                            }
                        }
                        current = Some((style, is_default));
                    }
                    b"w:pPr" if current.is_some() => in_ppr = true,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Empty(e)) => {
                    if let Some((ref mut style, _)) = current {
                        match e.name().as_ref() {
                            b"w:name" => {
                                if let Some(val) = get_attr(&e, b"w:val") {
                                    style.name = val;
                                }
                            }
                            b"w:basedOn" => style.based_on = get_attr(&e, b"w:val"),
                            b"w:outlineLvl" if in_ppr => {
                                // 0-8 are outline levels; 9 is body text
                                style.outline_level = get_attr(&e, b"w:val")
                                    .and_then(|v| v.parse::<u8>().ok())
                                    .filter(|level| *level <= 8);
                            }
                            b"w:pageBreakBefore" if in_ppr => {
                                style.page_break_before =
                                    Some(get_bool_attr(&e, b"w:val").unwrap_or(true));
                            }
                            _ => {}
                        }
                    }
                }
                Ok(quick_xml::events::Event::End(e)) => match e.name().as_ref() {
                    b"w:style" => {
                        if let Some((style, is_default)) = current.take() {
                            map.insert(style, is_default);
                        }
                        in_ppr = false;
                    }
                    b"w:pPr" => in_ppr = false,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(map)
    }

    fn insert(&mut self, style: Style, is_default: bool) {
        if style.id.is_empty() {
            return;
        }
        if style.style_type == Some(StyleType::Paragraph) {
            if is_default {
                self.default_paragraph = Some(style.id.clone());
            }
            if !self.styles.contains_key(&style.id) {
                self.paragraph_order.push(style.id.clone());
            }
        }
        self.styles.insert(style.id.clone(), style);
    }

    /// Walk the `basedOn` chain starting at `id`, nearest first.
    ///
    /// Bounded to guard against cycles in malformed documents.
    fn chain<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Style> + 'a {
        let mut next = self.styles.get(id);
        let mut depth = 0;
        std::iter::from_fn(move || {
            let style = next?;
            depth += 1;
            next = if depth > 10 {
                None
            } else {
                style.based_on.as_deref().and_then(|b| self.styles.get(b))
            };
            Some(style)
        })
    }

    /// Whether paragraphs with this style start a new page.
    pub fn page_break_before(&self, id: &str) -> bool {
        self.chain(id)
            .find_map(|s| s.page_break_before)
            .unwrap_or(false)
    }

    /// Get the heading level for a style ID.
    pub fn get_heading_level(&self, id: &str) -> HeadingLevel {
        if let Some(level) = self.chain(id).find_map(|s| s.outline_level) {
            return HeadingLevel::from_number(level.saturating_add(1));
        }
        match self.styles.get(id).map(|s| s.name.to_lowercase()).as_deref() {
            Some("title") => HeadingLevel::H1,
            Some("subtitle") => HeadingLevel::H2,
            _ => HeadingLevel::None,
        }
    }

    /// Resolve a paragraph style ID to its model form.
    ///
    /// Unknown IDs still resolve, using the ID as the display name, since
    /// documents may reference styles they never define.
    pub fn resolve(&self, id: &str) -> ParagraphStyle {
        let name = self
            .styles
            .get(id)
            .map(|s| s.display_name().to_string())
            .unwrap_or_else(|| id.to_string());
        ParagraphStyle {
            id: id.to_string(),
            name,
            page_break_before: self.page_break_before(id),
            heading: self.get_heading_level(id),
        }
    }

    /// All paragraph styles in definition order.
    pub fn paragraph_styles(&self) -> Vec<ParagraphStyle> {
        self.paragraph_order.iter().map(|id| self.resolve(id)).collect()
    }
}

fn get_attr(e: &quick_xml::events::BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Helper to get a boolean attribute value.
pub(crate) fn get_bool_attr(e: &quick_xml::events::BytesStart, key: &[u8]) -> Option<bool> {
    get_attr(e, key).map(|val| val != "0" && val != "false" && val != "off")
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
        <w:name w:val="Normal"/>
    </w:style>
    <w:style w:type="character" w:styleId="Strong">
        <w:name w:val="Strong"/>
    </w:style>
    <w:style w:type="paragraph" w:styleId="Heading1">
        <w:name w:val="heading 1"/>
        <w:basedOn w:val="Normal"/>
        <w:pPr>
            <w:outlineLvl w:val="0"/>
        </w:pPr>
    </w:style>
    <w:style w:type="paragraph" w:styleId="ProductName">
        <w:name w:val="Product Name"/>
        <w:basedOn w:val="Heading1"/>
        <w:pPr>
            <w:pageBreakBefore/>
        </w:pPr>
    </w:style>
    <w:style w:type="paragraph" w:styleId="Caption">
        <w:basedOn w:val="ProductName"/>
        <w:pPr>
            <w:pageBreakBefore w:val="0"/>
        </w:pPr>
    </w:style>
</w:styles>"#;

    #[test]
    fn test_paragraph_styles_in_order() {
        let map = StyleMap::parse(STYLES).unwrap();
        let names: Vec<_> = map.paragraph_styles().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Normal", "heading 1", "Product Name", "Caption"]);
        assert_eq!(map.default_paragraph.as_deref(), Some("Normal"));
    }

    #[test]
    fn test_inherited_properties() {
        let map = StyleMap::parse(STYLES).unwrap();
        assert_eq!(map.get_heading_level("Heading1"), HeadingLevel::H1);
        assert_eq!(map.get_heading_level("ProductName"), HeadingLevel::H1);
        assert_eq!(map.get_heading_level("Normal"), HeadingLevel::None);

        assert!(map.page_break_before("ProductName"));
        assert!(!map.page_break_before("Caption"));
        assert!(!map.page_break_before("Normal"));
    }

    #[test]
    fn test_resolve_unknown_style() {
        let map = StyleMap::parse(STYLES).unwrap();
        let style = map.resolve("Ghost");
        assert_eq!(style.name, "Ghost");
        assert!(!style.page_break_before);
    }

    #[test]
    fn test_title_heading_by_name() {
        let xml = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    <w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/></w:style>
</w:styles>"#;
        let map = StyleMap::parse(xml).unwrap();
        assert_eq!(map.get_heading_level("Title"), HeadingLevel::H1);
    }

    #[test]
    fn test_empty_styles() {
        let map = StyleMap::parse("  ").unwrap();
        assert!(map.paragraph_styles().is_empty());
    }

    #[test]
    fn test_based_on_cycle_terminates() {
        let xml = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    <w:style w:type="paragraph" w:styleId="A"><w:name w:val="A"/><w:basedOn w:val="B"/></w:style>
    <w:style w:type="paragraph" w:styleId="B"><w:name w:val="B"/><w:basedOn w:val="A"/></w:style>
</w:styles>"#;
        let map = StyleMap::parse(xml).unwrap();
        assert!(!map.page_break_before("A"));
        assert_eq!(map.get_heading_level("A"), HeadingLevel::None);
    }

    #[test]
    fn test_out_of_range_outline_level_is_body_text() {
        let xml = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    <w:style w:type="paragraph" w:styleId="Wild"><w:name w:val="Wild"/><w:pPr><w:outlineLvl w:val="255"/></w:pPr></w:style>
    <w:style w:type="paragraph" w:styleId="Body"><w:name w:val="Body"/><w:pPr><w:outlineLvl w:val="9"/></w:pPr></w:style>
    <w:style w:type="paragraph" w:styleId="Deep"><w:name w:val="Deep"/><w:pPr><w:outlineLvl w:val="1"/></w:pPr></w:style>
</w:styles>"#;
        let map = StyleMap::parse(xml).unwrap();
        assert_eq!(map.get_heading_level("Wild"), HeadingLevel::None);
        assert_eq!(map.get_heading_level("Body"), HeadingLevel::None);
        assert_eq!(map.get_heading_level("Deep"), HeadingLevel::H2);
    }
}
