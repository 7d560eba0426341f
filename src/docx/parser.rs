//! DOCX parser implementation.
//!
//! Word documents have no fixed pages in their markup, so pages are cut at
//! explicit breaks: hard page breaks inside runs, `pageBreakBefore` on a
//! paragraph or its style, and section breaks that start a new page.

use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use crate::model::{Document, Page, Paragraph};
use quick_xml::events::{BytesStart, Event};
use unicode_normalization::UnicodeNormalization;

use super::styles::{get_bool_attr, StyleMap};

/// How a section begins relative to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionStart {
    Continuous,
    NewPage,
}

impl SectionStart {
    fn from_val(val: &str) -> Self {
        match val {
            "continuous" => SectionStart::Continuous,
            // nextPage, oddPage, evenPage, nextColumn
            _ => SectionStart::NewPage,
        }
    }
}

/// A paragraph being collected from the event stream.
#[derive(Debug, Default)]
struct ParagraphBuilder {
    style_id: Option<String>,
    /// Text split at hard page breaks
    segments: Vec<String>,
    break_before: Option<bool>,
    ends_section: bool,
    ppr_depth: u8,
    in_text: bool,
}

impl ParagraphBuilder {
    fn new() -> Self {
        Self {
            segments: vec![String::new()],
            ..Default::default()
        }
    }

    fn push_str(&mut self, text: &str) {
        if let Some(last) = self.segments.last_mut() {
            last.push_str(text);
        }
    }

    fn push_char(&mut self, c: char) {
        if let Some(last) = self.segments.last_mut() {
            last.push(c);
        }
    }

    fn page_break(&mut self) {
        self.segments.push(String::new());
    }
}

#[derive(Debug)]
enum Item {
    Paragraph(ParagraphBuilder),
    SectionEnd,
}

/// Parser for DOCX (Word) documents.
pub struct DocxParser {
    container: OoxmlContainer,
    styles: StyleMap,
}

impl DocxParser {
    /// Open a DOCX file for parsing.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let container = OoxmlContainer::open(path)?;
        Self::from_container(container)
    }

    /// Create a parser from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_container(container)
    }

    fn from_container(container: OoxmlContainer) -> Result<Self> {
        let styles = match container.read_xml("word/styles.xml") {
            Ok(xml) => StyleMap::parse(&xml)?,
            Err(_) => {
                log::debug!("word/styles.xml missing, document has no named styles");
                StyleMap::default()
            }
        };
        Ok(Self { container, styles })
    }

    /// Parse the document and return a paginated Document model.
    pub fn parse(&mut self) -> Result<Document> {
        let mut doc = Document::new();
        doc.metadata = self.container.parse_core_metadata()?;
        doc.styles = self.styles.paragraph_styles();

        let xml = self.container.read_xml("word/document.xml")?;
        let (items, sections) = collect_items(&xml)?;
        for page in paginate(items, &sections, &self.styles) {
            doc.add_page(page);
        }

        log::debug!(
            "parsed {} pages, {} paragraph styles",
            doc.page_count(),
            doc.styles.len()
        );
        Ok(doc)
    }
}

/// Walk `document.xml` once, collecting paragraphs, section ends and the
/// start type of every section in order.
fn collect_items(xml: &str) -> Result<(Vec<Item>, Vec<SectionStart>)> {
    let mut reader = quick_xml::Reader::from_str(xml);
    // Keep whitespace: w:t content is significant
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut items = Vec::new();
    let mut sections = Vec::new();
    let mut stack: Vec<ParagraphBuilder> = Vec::new();

    let mut sect_depth: u32 = 0;
    let mut sect_start: Option<SectionStart> = None;
    // mc:Fallback repeats the mc:Choice content (e.g. VML text boxes)
    let mut fallback_depth: u32 = 0;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if fallback_depth > 0 || e.name().as_ref() == b"mc:Fallback" {
                    fallback_depth += 1;
                } else {
                    match e.name().as_ref() {
                        b"w:p" => stack.push(ParagraphBuilder::new()),
                        b"w:pPr" => {
                            if let Some(p) = stack.last_mut() {
                                p.ppr_depth += 1;
                            }
                        }
                        b"w:sectPr" => {
                            if sect_depth == 0 {
                                sect_start = None;
                                if let Some(p) = stack.last_mut().filter(|p| p.ppr_depth == 1) {
                                    p.ends_section = true;
                                }
                            }
                            sect_depth += 1;
                        }
                        b"w:t" => {
                            if let Some(p) = stack.last_mut() {
                                p.in_text = true;
                            }
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::Empty(ref e)) if fallback_depth == 0 => match e.name().as_ref() {
                b"w:p" => items.push(Item::Paragraph(ParagraphBuilder::new())),
                b"w:sectPr" => {
                    if let Some(p) = stack.last_mut().filter(|p| p.ppr_depth == 1) {
                        p.ends_section = true;
                    }
                    if sect_depth == 0 {
                        sections.push(SectionStart::NewPage);
                    }
                }
                b"w:type" if sect_depth == 1 => {
                    sect_start = attr_value(e, b"w:val").map(|v| SectionStart::from_val(&v));
                }
                _ => {
                    if let Some(p) = stack.last_mut() {
                        paragraph_empty_element(p, e);
                    }
                }
            },
            Ok(Event::Text(ref e)) if fallback_depth == 0 => {
                if let Some(p) = stack.last_mut().filter(|p| p.in_text) {
                    let text = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                    p.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                if fallback_depth > 0 {
                    fallback_depth -= 1;
                } else {
                    match e.name().as_ref() {
                        b"w:p" => {
                            if let Some(p) = stack.pop() {
                                let ends_section = p.ends_section;
                                items.push(Item::Paragraph(p));
                                if ends_section {
                                    items.push(Item::SectionEnd);
                                }
                            }
                        }
                        b"w:pPr" => {
                            if let Some(p) = stack.last_mut() {
                                p.ppr_depth = p.ppr_depth.saturating_sub(1);
                            }
                        }
                        b"w:sectPr" => {
                            sect_depth = sect_depth.saturating_sub(1);
                            if sect_depth == 0 {
                                sections.push(sect_start.take().unwrap_or(SectionStart::NewPage));
                            }
                        }
                        b"w:t" => {
                            if let Some(p) = stack.last_mut() {
                                p.in_text = false;
                            }
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok((items, sections))
}

/// Handle a self-closing element inside a paragraph.
fn paragraph_empty_element(p: &mut ParagraphBuilder, e: &BytesStart) {
    match e.name().as_ref() {
        b"w:pStyle" if p.ppr_depth == 1 => p.style_id = attr_value(e, b"w:val"),
        b"w:pageBreakBefore" if p.ppr_depth == 1 => {
            p.break_before = Some(get_bool_attr(e, b"w:val").unwrap_or(true));
        }
        // w:tab inside pPr is a tab stop definition, not a character
        b"w:tab" if p.ppr_depth == 0 => p.push_char('\t'),
        b"w:br" if p.ppr_depth == 0 => match attr_value(e, b"w:type").as_deref() {
            Some("page") => p.page_break(),
            _ => p.push_char('\n'),
        },
        b"w:cr" if p.ppr_depth == 0 => p.push_char('\n'),
        b"w:noBreakHyphen" if p.ppr_depth == 0 => p.push_char('-'),
        _ => {}
    }
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Lay collected items out on pages.
fn paginate(items: Vec<Item>, sections: &[SectionStart], styles: &StyleMap) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut current = Page::new(0);
    let mut sections_ended = 0;

    for item in items {
        match item {
            Item::Paragraph(builder) => {
                let style = builder
                    .style_id
                    .as_deref()
                    .or(styles.default_paragraph.as_deref())
                    .map(|id| styles.resolve(id));

                let break_before = builder
                    .break_before
                    .unwrap_or_else(|| style.as_ref().is_some_and(|s| s.page_break_before));
                if break_before && !current.is_empty() {
                    pages.push(std::mem::replace(&mut current, Page::new(0)));
                }

                let split = builder.segments.len() > 1;
                for (i, segment) in builder.segments.into_iter().enumerate() {
                    if i > 0 {
                        pages.push(std::mem::replace(&mut current, Page::new(0)));
                    }
                    // Text around a hard break is only kept when present
                    if split && segment.is_empty() {
                        continue;
                    }
                    let text: String = segment.nfc().collect();
                    current.add_paragraph(match style {
                        Some(ref s) => Paragraph::styled(s, text),
                        None => Paragraph::with_text(text),
                    });
                }
            }
            Item::SectionEnd => {
                sections_ended += 1;
                // A section break takes the start type of the section after it
                let next = sections
                    .get(sections_ended)
                    .copied()
                    .unwrap_or(SectionStart::NewPage);
                if next == SectionStart::NewPage {
                    pages.push(std::mem::replace(&mut current, Page::new(0)));
                }
            }
        }
    }

    // A final break leaves a page with nothing visible on it
    let blank = current.paragraphs.iter().all(Paragraph::is_empty);
    if !blank || pages.is_empty() {
        pages.push(current);
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
    <w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/></w:style>
    <w:style w:type="paragraph" w:styleId="Record"><w:name w:val="Record Start"/><w:pPr><w:pageBreakBefore/></w:pPr></w:style>
</w:styles>"#;

    fn pages(body: &str) -> Vec<Page> {
        let xml = format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"><w:body>{}</w:body></w:document>"#,
            body
        );
        let styles = StyleMap::parse(STYLES).unwrap();
        let (items, sections) = collect_items(&xml).unwrap();
        paginate(items, &sections, &styles)
    }

    fn texts(page: &Page) -> Vec<&str> {
        page.paragraphs.iter().map(|p| p.text.as_str()).collect()
    }

    #[test]
    fn test_single_page_with_default_style() {
        let pages = pages(r#"<w:p><w:r><w:t>Hello</w:t></w:r></w:p>"#);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].paragraphs[0].style_name.as_deref(), Some("Normal"));
        assert_eq!(texts(&pages[0]), vec!["Hello"]);
    }

    #[test]
    fn test_hard_page_break_splits_paragraph() {
        let pages = pages(
            r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr>
                <w:r><w:t>Before</w:t><w:br w:type="page"/><w:t>After</w:t></w:r></w:p>"#,
        );
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].find_styled_text("Title"), Some("Before"));
        assert_eq!(pages[1].find_styled_text("Title"), Some("After"));
    }

    #[test]
    fn test_break_only_paragraph_adds_no_text() {
        let pages = pages(
            r#"<w:p><w:r><w:t>One</w:t></w:r></w:p>
               <w:p><w:r><w:br w:type="page"/></w:r></w:p>
               <w:p><w:r><w:t>Two</w:t></w:r></w:p>"#,
        );
        assert_eq!(pages.len(), 2);
        assert_eq!(texts(&pages[0]), vec!["One"]);
        assert_eq!(texts(&pages[1]), vec!["Two"]);
    }

    #[test]
    fn test_page_break_before_from_style() {
        let pages = pages(
            r#"<w:p><w:pPr><w:pStyle w:val="Record"/></w:pPr><w:r><w:t>A</w:t></w:r></w:p>
               <w:p><w:r><w:t>a body</w:t></w:r></w:p>
               <w:p><w:pPr><w:pStyle w:val="Record"/></w:pPr><w:r><w:t>B</w:t></w:r></w:p>"#,
        );
        // no empty first page
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].find_styled_text("Record Start"), Some("B"));
    }

    #[test]
    fn test_direct_formatting_overrides_style_break() {
        let pages = pages(
            r#"<w:p><w:r><w:t>A</w:t></w:r></w:p>
               <w:p><w:pPr><w:pStyle w:val="Record"/><w:pageBreakBefore w:val="0"/></w:pPr><w:r><w:t>B</w:t></w:r></w:p>"#,
        );
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_mail_merge_sections() {
        let record = |name: &str| {
            format!(
                r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>
                   <w:p><w:pPr><w:sectPr><w:type w:val="nextPage"/></w:sectPr></w:pPr></w:p>"#,
                name
            )
        };
        let body = format!(
            "{}{}{}<w:sectPr><w:type w:val=\"nextPage\"/></w:sectPr>",
            record("Apples"),
            record("Pears"),
            record("Plums")
        );
        let pages = pages(&body);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2].find_styled_text("Title"), Some("Plums"));
    }

    #[test]
    fn test_continuous_section_does_not_break() {
        let pages = pages(
            r#"<w:p><w:pPr><w:sectPr/></w:pPr><w:r><w:t>One</w:t></w:r></w:p>
               <w:p><w:r><w:t>Two</w:t></w:r></w:p>
               <w:sectPr><w:type w:val="continuous"/></w:sectPr>"#,
        );
        assert_eq!(pages.len(), 1);
        assert_eq!(texts(&pages[0]), vec!["One", "Two"]);
    }

    #[test]
    fn test_tracked_style_change_ignored() {
        let pages = pages(
            r#"<w:p><w:pPr><w:pStyle w:val="Title"/>
                <w:pPrChange><w:pPr><w:pStyle w:val="Normal"/></w:pPr></w:pPrChange>
               </w:pPr><w:r><w:t>Name</w:t></w:r></w:p>"#,
        );
        assert_eq!(pages[0].find_styled_text("Title"), Some("Name"));
    }

    #[test]
    fn test_text_box_fallback_not_duplicated() {
        let pages = pages(
            r#"<w:p><w:r><mc:AlternateContent>
                 <mc:Choice><w:drawing><w:txbxContent>
                   <w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Boxed</w:t></w:r></w:p>
                 </w:txbxContent></w:drawing></mc:Choice>
                 <mc:Fallback><w:pict><w:txbxContent>
                   <w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Boxed</w:t></w:r></w:p>
                 </w:txbxContent></w:pict></mc:Fallback>
               </mc:AlternateContent></w:r></w:p>"#,
        );
        let titles = pages[0]
            .paragraphs
            .iter()
            .filter(|p| p.has_style("Title"))
            .count();
        assert_eq!(titles, 1);
    }

    #[test]
    fn test_tabs_breaks_and_entities() {
        let pages = pages(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
                <w:r><w:t xml:space="preserve">Salt &amp; </w:t><w:tab/><w:t>Pepper</w:t><w:br/><w:t>Co</w:t></w:r></w:p>"#,
        );
        assert_eq!(texts(&pages[0]), vec!["Salt & \tPepper\nCo"]);
    }

    #[test]
    fn test_text_is_nfc_normalized() {
        let pages = pages("<w:p><w:r><w:t>Cafe\u{301}</w:t></w:r></w:p>");
        assert_eq!(texts(&pages[0]), vec!["Caf\u{e9}"]);
    }

    #[test]
    fn test_trailing_break_dropped_and_empty_document_has_a_page() {
        let pages = pages(r#"<w:p><w:r><w:t>Only</w:t><w:br w:type="page"/></w:r></w:p><w:p/>"#);
        assert_eq!(pages.len(), 1);

        let empty = super::tests::pages("");
        assert_eq!(empty.len(), 1);
        assert!(empty[0].is_empty());
    }
}
