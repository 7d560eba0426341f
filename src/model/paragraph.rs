//! Paragraph and style models.

use serde::{Deserialize, Serialize};

/// Heading level (h1-h6 or none).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadingLevel {
    #[default]
    None,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// Create a heading level from a number (1-6).
    pub fn from_number(n: u8) -> Self {
        match n {
            1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            3 => HeadingLevel::H3,
            4 => HeadingLevel::H4,
            5 => HeadingLevel::H5,
            6 => HeadingLevel::H6,
            _ => HeadingLevel::None,
        }
    }

    /// Get the numeric level (0 for none, 1-6 for headings).
    pub fn level(&self) -> u8 {
        match self {
            HeadingLevel::None => 0,
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
            HeadingLevel::H5 => 5,
            HeadingLevel::H6 => 6,
        }
    }

    /// Check if this is a heading (not None).
    pub fn is_heading(&self) -> bool {
        !matches!(self, HeadingLevel::None)
    }

    fn is_none(&self) -> bool {
        !self.is_heading()
    }
}

/// A named paragraph style defined by the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Style ID used in the markup (e.g. "Heading1")
    pub id: String,

    /// Display name (e.g. "heading 1"); falls back to the ID
    pub name: String,

    /// Paragraphs with this style start on a new page
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub page_break_before: bool,

    /// Heading level derived from the outline level or the name
    #[serde(default, skip_serializing_if = "HeadingLevel::is_none")]
    pub heading: HeadingLevel,
}

impl ParagraphStyle {
    /// Create a style with the given ID and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A paragraph of text on a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Style ID reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,

    /// Resolved style display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_name: Option<String>,

    /// Heading level inherited from the style
    #[serde(default, skip_serializing_if = "HeadingLevel::is_none")]
    pub heading: HeadingLevel,

    /// Paragraph text; tabs are `\t`, line breaks `\n`
    pub text: String,
}

impl Paragraph {
    /// Create an unstyled paragraph with the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create a paragraph carrying a style.
    pub fn styled(style: &ParagraphStyle, text: impl Into<String>) -> Self {
        Self {
            style_id: Some(style.id.clone()),
            style_name: Some(style.name.clone()),
            heading: style.heading,
            text: text.into(),
        }
    }

    /// Whether this paragraph carries the referenced style, by display
    /// name first and ID second.
    pub fn has_style(&self, reference: &str) -> bool {
        self.style_name.as_deref() == Some(reference) || self.style_id.as_deref() == Some(reference)
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
