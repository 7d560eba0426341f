//! Export service backed by a parsed Word document.

use super::layout::PageGeometry;
#[cfg(feature = "pdf")]
use super::pdf;
#[cfg(feature = "raster")]
use super::raster;
use super::{DocumentExportService, ExportFormat, InteractionLevel, ServicePreferences};
use crate::detect::{detect_format_from_bytes, detect_format_from_path, FormatType};
use crate::docx::DocxParser;
use crate::error::{Error, Result};
use crate::model::{Document, Page};
use std::fs;
use std::path::{Path, PathBuf};

/// Exports pages of a DOCX document as PDF, JPEG or PNG files.
#[derive(Debug, Clone)]
pub struct DocxExportService {
    document: Document,
    path: Option<PathBuf>,
    preferences: ServicePreferences,
    geometry: PageGeometry,
}

impl DocxExportService {
    /// Open and parse a DOCX file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure_exportable(detect_format_from_path(path)?)?;

        let document = DocxParser::open(path)?.parse()?;
        let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Ok(Self::from_document(document, Some(path)))
    }

    /// Parse a DOCX held in memory. The result has no document path, so
    /// [`run_export`](super::run_export) treats it as unsaved.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        ensure_exportable(detect_format_from_bytes(&data)?)?;
        let document = DocxParser::from_bytes(data)?.parse()?;
        Ok(Self::from_document(document, None))
    }

    /// Wrap an already parsed document.
    pub fn from_document(document: Document, path: Option<PathBuf>) -> Self {
        Self {
            document,
            path,
            preferences: ServicePreferences::default(),
            geometry: PageGeometry::A4,
        }
    }

    /// The parsed document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn title(&self, page: &Page) -> String {
        let base = self
            .document
            .metadata
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .or_else(|| {
                self.path
                    .as_deref()
                    .and_then(Path::file_stem)
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "Untitled".to_string());
        format!("{} - page {}", base, page.number())
    }

    fn render_page(&self, page: &Page, format: ExportFormat) -> Result<Vec<u8>> {
        match format {
            #[cfg(feature = "pdf")]
            ExportFormat::Pdf => pdf::render_pdf(page, &self.title(page), &self.geometry),
            #[cfg(feature = "raster")]
            ExportFormat::Jpeg | ExportFormat::Png => {
                raster::render_raster(page, format, &self.preferences.render, &self.geometry)
            }
            #[allow(unreachable_patterns)]
            other => Err(Error::UnsupportedFormat(format!(
                "{} output is not enabled in this build",
                other
            ))),
        }
    }

    fn preflight(&self, bytes: &[u8], format: ExportFormat) -> Result<()> {
        match format {
            #[cfg(feature = "pdf")]
            ExportFormat::Pdf => pdf::verify_pdf(bytes).map(|sheets| {
                log::debug!("Preflight: PDF with {} sheet(s)", sheets);
            }),
            #[cfg(feature = "raster")]
            ExportFormat::Jpeg | ExportFormat::Png => {
                raster::verify_raster(bytes).map(|(w, h)| {
                    log::debug!("Preflight: {}x{} {}", w, h, format);
                })
            }
            #[allow(unreachable_patterns)]
            _ => {
                let _ = bytes;
                Ok(())
            }
        }
    }
}

fn ensure_exportable(format: FormatType) -> Result<()> {
    if format.is_exportable() {
        Ok(())
    } else {
        Err(Error::UnsupportedFormat(format!(
            "{} documents have no paragraph styles to export by; use a Word document",
            format
        )))
    }
}

impl DocumentExportService for DocxExportService {
    fn document_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn page_count(&self) -> usize {
        self.document.page_count()
    }

    fn list_styles(&self) -> Vec<String> {
        self.document.style_names()
    }

    fn find_styled_text(&self, page: usize, style: &str) -> Option<String> {
        self.document
            .page(page)?
            .find_styled_text(style)
            .map(str::to_string)
    }

    fn export_page(
        &mut self,
        page: usize,
        format: ExportFormat,
        destination: &Path,
    ) -> Result<()> {
        let doc_page = self.document.page(page).ok_or(Error::PageOutOfRange {
            page: page + 1,
            count: self.document.page_count(),
        })?;

        if self.preferences.interaction == InteractionLevel::Interactive && destination.exists() {
            return Err(Error::DestinationExists(destination.to_path_buf()));
        }

        let bytes = self.render_page(doc_page, format)?;
        if self.preferences.preflight {
            self.preflight(&bytes, format)?;
        }

        fs::write(destination, &bytes)?;
        log::info!(
            "Exported page {} to {} ({} bytes)",
            page + 1,
            destination.display(),
            bytes.len()
        );
        Ok(())
    }

    fn preferences(&self) -> ServicePreferences {
        self.preferences
    }

    fn set_preferences(&mut self, preferences: ServicePreferences) {
        self.preferences = preferences;
    }
}
