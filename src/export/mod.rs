//! Per-page export.
//!
//! The [`runner`] drives an export run against any
//! [`DocumentExportService`]; [`DocxExportService`] is the implementation
//! backed by Word documents.

mod docx_service;
mod layout;
mod options;
#[cfg(feature = "pdf")]
mod pdf;
#[cfg(feature = "raster")]
mod raster;
pub mod runner;
mod service;
mod settings;

pub use docx_service::DocxExportService;
pub use layout::{wrap_page, PageGeometry, TextLine};
pub use options::{ExportOptions, PageSelection, RenderSettings};
pub use runner::{
    plan_export, run_export, ExportPlan, ExportReport, ExportedPage, Interaction, PageFailure,
    PlannedPage,
};
pub use service::{DocumentExportService, InteractionLevel, PreferencesGuard, ServicePreferences};
pub use settings::ExportSettings;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output format for exported pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    #[serde(rename = "jpg", alias = "jpeg")]
    Jpeg,
    Png,
}

impl ExportFormat {
    /// All formats, in the order offered to users.
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Pdf, ExportFormat::Jpeg, ExportFormat::Png];

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Png => "png",
        }
    }

    /// Filter offered when choosing where to save.
    pub fn file_filter(&self) -> FileFilter {
        match self {
            ExportFormat::Pdf => FileFilter::new("PDF Files", &["*.pdf"]),
            ExportFormat::Jpeg => FileFilter::new("JPEG Files", &["*.jpg", "*.jpeg"]),
            ExportFormat::Png => FileFilter::new("PNG Files", &["*.png"]),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "png" => Ok(ExportFormat::Png),
            other => Err(Error::InvalidOption(format!("unknown export format '{}'", other))),
        }
    }
}

/// A save-dialog style file filter, e.g. `JPEG Files:*.jpg,*.jpeg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    /// Human-readable description
    pub description: &'static str,
    /// Glob patterns
    pub patterns: Vec<&'static str>,
}

impl FileFilter {
    fn new(description: &'static str, patterns: &[&'static str]) -> Self {
        Self {
            description,
            patterns: patterns.to_vec(),
        }
    }
}

impl fmt::Display for FileFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.description, self.patterns.join(","))
    }
}
