//! Document and page structures.

use super::{Paragraph, ParagraphStyle};
use serde::{Deserialize, Serialize};

/// Document metadata extracted from `docProps/core.xml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Document author/creator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Document subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Creation date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Last modification date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

/// One page of the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-based)
    pub index: usize,

    /// Paragraphs in reading order
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

impl Page {
    /// Create a new empty page with the given index.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            paragraphs: Vec::new(),
        }
    }

    /// 1-based page number, as shown to users.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Add a paragraph to this page.
    pub fn add_paragraph(&mut self, para: Paragraph) {
        self.paragraphs.push(para);
    }

    /// Check if this page has no paragraphs.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Text of the first paragraph carrying the referenced style.
    pub fn find_styled_text(&self, style: &str) -> Option<&str> {
        self.paragraphs
            .iter()
            .find(|p| p.has_style(style))
            .map(|p| p.text.as_str())
    }

    /// Extract all text on the page.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A parsed document, split into pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,

    /// Paragraph styles in definition order
    #[serde(default)]
    pub styles: Vec<ParagraphStyle>,

    /// Pages in order
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page, renumbering it to follow the existing pages.
    pub fn add_page(&mut self, mut page: Page) {
        page.index = self.pages.len();
        self.pages.push(page);
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a page by 0-based index.
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Paragraph style display names in definition order.
    pub fn style_names(&self) -> Vec<String> {
        self.styles.iter().map(|s| s.name.clone()).collect()
    }

    /// 1-based numbers of the pages where the style appears.
    pub fn pages_with_style(&self, style: &str) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|p| p.find_styled_text(style).is_some())
            .map(Page::number)
            .collect()
    }

    /// Check if the document has no text at all.
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(Page::is_empty)
    }
}
