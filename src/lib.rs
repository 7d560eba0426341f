//! # stylesplit
//!
//! Split a document into one file per page, naming every file after the
//! text of a chosen paragraph style on that page.
//!
//! The naming core is [`sanitize`], a pure function that turns arbitrary
//! text into a short, filesystem-safe fragment. The export loop in
//! [`run_export`] works against any [`DocumentExportService`]; this crate
//! ships [`DocxExportService`] for Word documents.
//!
//! ## Quick Start
//!
//! ```
//! use stylesplit::sanitize;
//!
//! assert_eq!(sanitize(Some("50% off — today!")).as_str(), "50pct-off-today");
//! assert_eq!(sanitize(None).as_str(), "unnamed");
//! ```
//!
//! ## Exporting pages
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use stylesplit::{run_export, ExportFormat, ExportOptions, FileFilter, Interaction};
//!
//! struct NextToDocument;
//!
//! impl Interaction for NextToDocument {
//!     fn choose_save_location(&mut self, suggested: &Path, _: &FileFilter) -> Option<PathBuf> {
//!         Some(suggested.to_path_buf())
//!     }
//!     fn confirm(&mut self, _: &str) -> bool {
//!         true
//!     }
//! }
//!
//! let mut service = stylesplit::open_for_export("catalog.docx")?;
//! let options = ExportOptions::new()
//!     .with_style("Product Name")
//!     .with_suffix("-Market-Sheet")
//!     .with_format(ExportFormat::Png);
//!
//! let report = run_export(&mut service, &mut NextToDocument, &options)?;
//! println!("{} pages written to {}", report.exported.len(), report.folder.display());
//! # Ok::<(), stylesplit::Error>(())
//! ```
//!
//! ## Features
//!
//! - `pdf` (default): PDF output through `lopdf`
//! - `raster` (default): JPEG and PNG output through `image`

pub mod container;
pub mod detect;
pub mod docx;
pub mod error;
pub mod export;
pub mod model;
pub mod sanitize;

// Re-exports
pub use container::OoxmlContainer;
pub use detect::{detect_format_from_bytes, detect_format_from_path, FormatType};
pub use error::{Error, Result};
pub use export::{
    plan_export, run_export, DocumentExportService, DocxExportService, ExportFormat,
    ExportOptions, ExportPlan, ExportReport, ExportSettings, ExportedPage, FileFilter,
    Interaction, InteractionLevel, PageFailure, PageSelection, PlannedPage, PreferencesGuard,
    RenderSettings, ServicePreferences,
};
pub use model::{Document, HeadingLevel, Metadata, Page, Paragraph, ParagraphStyle};
pub use sanitize::{sanitize, FilenameFragment};

use std::path::Path;

/// Parse a Word document into pages.
///
/// # Example
///
/// ```no_run
/// let doc = stylesplit::parse_file("catalog.docx")?;
/// println!("Pages: {}", doc.page_count());
/// # Ok::<(), stylesplit::Error>(())
/// ```
pub fn parse_file(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    match detect_format_from_path(path)? {
        FormatType::Docx => docx::DocxParser::open(path)?.parse(),
        other => Err(Error::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a Word document held in memory.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    match detect_format_from_bytes(data)? {
        FormatType::Docx => docx::DocxParser::from_bytes(data.to_vec())?.parse(),
        other => Err(Error::UnsupportedFormat(other.to_string())),
    }
}

/// Open a Word document as an export service.
pub fn open_for_export(path: impl AsRef<Path>) -> Result<DocxExportService> {
    DocxExportService::open(path)
}
