//! Export options configuration.

use super::ExportFormat;
use crate::error::{Error, Result};
use crate::sanitize::FilenameFragment;
use serde::{Deserialize, Serialize};

/// Which pages an export run covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Every page in the document
    #[default]
    All,
    /// A single page, 1-based
    Single(usize),
}

/// Output quality settings for rendered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Raster resolution in pixels per inch
    pub resolution: u32,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl RenderSettings {
    /// Lowest accepted raster resolution.
    pub const MIN_RESOLUTION: u32 = 36;
    /// Highest accepted raster resolution.
    pub const MAX_RESOLUTION: u32 = 600;

    /// Set the raster resolution, clamped to the supported range.
    pub fn with_resolution(mut self, ppi: u32) -> Self {
        self.resolution = ppi.clamp(Self::MIN_RESOLUTION, Self::MAX_RESOLUTION);
        self
    }

    /// Set the JPEG quality, clamped to 1-100.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution: 72,
            jpeg_quality: 90,
        }
    }
}

/// Options for an export run.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Paragraph style that names each page (None = first style)
    pub style: Option<String>,

    /// Pages to export
    pub pages: PageSelection,

    /// Text placed before the sanitized fragment
    pub prefix: String,

    /// Text placed after the sanitized fragment
    pub suffix: String,

    /// Output format
    pub format: ExportFormat,

    /// Verify each rendered file before writing it
    pub preflight: bool,

    /// Resolution and quality for rendered output
    pub render: RenderSettings,
}

impl ExportOptions {
    /// Create new export options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the naming paragraph style.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Export a single page (1-based).
    pub fn with_page(mut self, page: usize) -> Self {
        self.pages = PageSelection::Single(page);
        self
    }

    /// Export every page.
    pub fn with_all_pages(mut self) -> Self {
        self.pages = PageSelection::All;
        self
    }

    /// Set the filename prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the filename suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable output verification.
    pub fn with_preflight(mut self, preflight: bool) -> Self {
        self.preflight = preflight;
        self
    }

    /// Set the raster resolution in ppi (clamped to 36-600).
    pub fn with_resolution(mut self, ppi: u32) -> Self {
        self.render = self.render.with_resolution(ppi);
        self
    }

    /// Set the JPEG quality (clamped to 1-100).
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.render = self.render.with_jpeg_quality(quality);
        self
    }

    /// Check that prefix and suffix keep the filename inside the export
    /// folder.
    pub fn validate(&self) -> Result<()> {
        for (label, value) in [("prefix", &self.prefix), ("suffix", &self.suffix)] {
            if value.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
                return Err(Error::InvalidOption(format!(
                    "{} '{}' may not contain path separators or control characters",
                    label,
                    value.escape_debug()
                )));
            }
        }
        if self.pages == PageSelection::Single(0) {
            return Err(Error::InvalidOption("page numbers start at 1".to_string()));
        }
        Ok(())
    }

    /// Full filename for a fragment: prefix, fragment, suffix, extension.
    pub fn filename(&self, fragment: &FilenameFragment) -> String {
        self.filename_with_stem(fragment.as_str())
    }

    pub(crate) fn filename_with_stem(&self, stem: &str) -> String {
        format!(
            "{}{}{}.{}",
            self.prefix,
            stem,
            self.suffix,
            self.format.extension()
        )
    }
}
