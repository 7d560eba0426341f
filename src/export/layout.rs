//! Text layout shared by the PDF and raster renderers.
//!
//! Layout uses the standard Helvetica metrics only approximately: every
//! glyph is assumed to be half an em wide. That is enough to keep text
//! inside the margins of a proof sheet without shipping font tables.

use crate::model::{HeadingLevel, Page};

/// Page size and margins in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Sheet width in points
    pub width: f32,
    /// Sheet height in points
    pub height: f32,
    /// Margin on every side, in points
    pub margin: f32,
}

impl PageGeometry {
    /// ISO A4 with 2 cm margins.
    pub const A4: PageGeometry = PageGeometry {
        width: 595.0,
        height: 842.0,
        margin: 56.0,
    };

    /// Width available for text.
    pub fn content_width(&self) -> f32 {
        (self.width - 2.0 * self.margin).max(1.0)
    }

    /// Height available for text.
    pub fn content_height(&self) -> f32 {
        (self.height - 2.0 * self.margin).max(1.0)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// A single laid-out line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Text of the line, without a trailing newline
    pub text: String,
    /// Font size in points
    pub font_size: f32,
    /// Set with the bold face
    pub bold: bool,
    /// Extra vertical space above the line, in points
    pub space_before: f32,
}

impl TextLine {
    /// Baseline-to-baseline distance.
    pub fn leading(&self) -> f32 {
        self.font_size * 1.25
    }

    /// Vertical space the line takes, including space before.
    pub fn height(&self) -> f32 {
        self.space_before + self.leading()
    }

    /// Estimated rendered width in points.
    pub fn width(&self) -> f32 {
        self.text.chars().count() as f32 * char_width(self.font_size)
    }
}

const BODY_SIZE: f32 = 11.0;

fn font_size(heading: HeadingLevel) -> f32 {
    match heading.level() {
        0 => BODY_SIZE,
        1 => 20.0,
        2 => 16.0,
        _ => 13.0,
    }
}

fn char_width(font_size: f32) -> f32 {
    font_size * 0.5
}

/// Lay out the paragraphs of a page as wrapped lines.
///
/// Headings are bold and larger. Explicit line breaks inside a paragraph
/// are kept; blank paragraphs become blank lines.
pub fn wrap_page(page: &Page, geometry: &PageGeometry) -> Vec<TextLine> {
    let mut lines = Vec::new();

    for (i, para) in page.paragraphs.iter().enumerate() {
        let size = font_size(para.heading);
        let bold = para.heading.is_heading();
        let max_chars = ((geometry.content_width() / char_width(size)).floor() as usize).max(1);
        let mut space_before = match (i, bold) {
            (0, _) => 0.0,
            (_, true) => size * 0.6,
            (_, false) => size * 0.4,
        };

        for source_line in para.text.split('\n') {
            for text in wrap_words(source_line, max_chars) {
                lines.push(TextLine {
                    text,
                    font_size: size,
                    bold,
                    space_before,
                });
                space_before = 0.0;
            }
        }
    }

    lines
}

/// Greedy word wrap; words longer than a line are split hard.
fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len > max_chars {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if word_len > max_chars {
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(max_chars) {
                if chunk.len() == max_chars {
                    out.push(chunk.iter().collect());
                } else {
                    current = chunk.iter().collect();
                    current_len = chunk.len();
                }
            }
            continue;
        }

        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if current_len > 0 || out.is_empty() {
        out.push(current);
    }
    out
}

/// Split laid-out lines into sheets that each fit the content area.
///
/// Always returns at least one sheet, so an empty page still renders.
pub fn split_sheets(lines: Vec<TextLine>, geometry: &PageGeometry) -> Vec<Vec<TextLine>> {
    let mut sheets = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();
    let mut used = 0.0;

    for mut line in lines {
        if !current.is_empty() && used + line.height() > geometry.content_height() {
            sheets.push(std::mem::take(&mut current));
            used = 0.0;
        }
        if current.is_empty() {
            line.space_before = 0.0;
        }
        used += line.height();
        current.push(line);
    }

    if !current.is_empty() || sheets.is_empty() {
        sheets.push(current);
    }
    sheets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Paragraph, ParagraphStyle};

    fn page_with(paragraphs: Vec<Paragraph>) -> Page {
        let mut page = Page::new(0);
        for p in paragraphs {
            page.add_paragraph(p);
        }
        page
    }

    #[test]
    fn test_wrap_words() {
        assert_eq!(wrap_words("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_words("", 10), vec![""]);
        assert_eq!(wrap_words("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_words("ab abcdefgh", 4), vec!["ab", "abcd", "efgh"]);
    }

    #[test]
    fn test_headings_are_bold_and_larger() {
        let mut heading = ParagraphStyle::new("Heading1", "heading 1");
        heading.heading = HeadingLevel::H1;
        let page = page_with(vec![
            Paragraph::styled(&heading, "Apples"),
            Paragraph::with_text("Crisp and sweet."),
        ]);

        let lines = wrap_page(&page, &PageGeometry::A4);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].bold);
        assert_eq!(lines[0].font_size, 20.0);
        assert_eq!(lines[0].space_before, 0.0);
        assert!(!lines[1].bold);
        assert!(lines[1].space_before > 0.0);
    }

    #[test]
    fn test_lines_fit_content_width() {
        let long = "word ".repeat(400);
        let page = page_with(vec![Paragraph::with_text(long)]);
        let geometry = PageGeometry::A4;

        let lines = wrap_page(&page, &geometry);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.width() <= geometry.content_width()));
    }

    #[test]
    fn test_line_breaks_kept() {
        let page = page_with(vec![Paragraph::with_text("12 Market St\nSpringfield")]);
        let lines = wrap_page(&page, &PageGeometry::A4);
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["12 Market St", "Springfield"]);
    }

    #[test]
    fn test_split_sheets_overflow() {
        let geometry = PageGeometry::A4;
        let paragraphs = (0..200).map(|i| Paragraph::with_text(format!("line {}", i))).collect();
        let lines = wrap_page(&page_with(paragraphs), &geometry);

        let sheets = split_sheets(lines, &geometry);
        assert!(sheets.len() > 1);
        assert_eq!(sheets.iter().map(Vec::len).sum::<usize>(), 200);
        for sheet in &sheets {
            let used: f32 = sheet.iter().map(TextLine::height).sum();
            assert!(used <= geometry.content_height());
            assert_eq!(sheet[0].space_before, 0.0);
        }
    }

    #[test]
    fn test_empty_page_has_one_sheet() {
        let sheets = split_sheets(Vec::new(), &PageGeometry::A4);
        assert_eq!(sheets.len(), 1);
        assert!(sheets[0].is_empty());
    }
}
