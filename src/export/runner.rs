//! The per-page export loop.
//!
//! [`run_export`] asks the user where to save, checks the folder, then
//! names every page after the text of its first paragraph in the chosen
//! style and hands it to the service. Problems with a single page are
//! reported and recorded; only problems with the document or the options
//! abort the run.

use super::{
    DocumentExportService, ExportOptions, FileFilter, InteractionLevel, PageSelection,
    PreferencesGuard, ServicePreferences,
};
use crate::error::{Error, Result};
use crate::sanitize::{sanitize, FilenameFragment};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Stem used when no page text is available to name the suggested file.
const PLACEHOLDER_STEM: &str = "temp";

/// Hidden file created and removed to check the folder is writable.
const WRITE_PROBE: &str = ".stylesplit-write-test";

/// User interaction during an export run.
pub trait Interaction {
    /// Ask where to save. The parent of the returned path becomes the
    /// export folder; `None` cancels the run.
    fn choose_save_location(&mut self, suggested: &Path, filter: &FileFilter) -> Option<PathBuf>;

    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str) -> bool;

    /// Report a problem that does not stop the run.
    fn warn(&mut self, message: &str) {
        log::warn!("{}", message);
    }

    /// Called before each page and once when all pages are done.
    fn progress(&mut self, _done: usize, _total: usize) {}
}

/// A page that was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedPage {
    /// 1-based page number
    pub page: usize,
    /// Sanitized text the filename was built from
    pub fragment: FilenameFragment,
    /// Where the file was written
    pub path: PathBuf,
}

/// A page whose export failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    /// 1-based page number
    pub page: usize,
    /// Error reported by the service
    pub reason: String,
}

/// Outcome of an export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Folder the pages were written to
    pub folder: PathBuf,
    /// Paragraph style used for naming
    pub style: String,
    /// Pages written, in page order
    pub exported: Vec<ExportedPage>,
    /// 1-based numbers of pages without a paragraph in the style
    pub skipped: Vec<usize>,
    /// Pages the service could not export
    pub failed: Vec<PageFailure>,
    /// The user cancelled before any page was exported
    pub cancelled: bool,
}

impl ExportReport {
    fn cancelled(folder: PathBuf, style: String) -> Self {
        Self {
            folder,
            style,
            cancelled: true,
            ..Default::default()
        }
    }

    /// True when nothing was skipped, failed or cancelled.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// The filename a page would get.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedPage {
    /// 1-based page number
    pub page: usize,
    /// Text of the naming paragraph, if the page has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Filename the page would be written to; `None` means skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Page to filename mapping for a set of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportPlan {
    /// Paragraph style used for naming
    pub style: String,
    /// Selected pages in order
    pub pages: Vec<PlannedPage>,
}

/// Work out the filenames an export would produce, without touching the
/// filesystem.
pub fn plan_export<S>(service: &S, options: &ExportOptions) -> Result<ExportPlan>
where
    S: DocumentExportService + ?Sized,
{
    options.validate()?;
    let style = resolve_style(&service.list_styles(), options.style.as_deref())?;
    let pages = selected_pages(options.pages, service.page_count())?;

    let pages = pages
        .into_iter()
        .map(|index| {
            let text = service.find_styled_text(index, &style);
            let filename = text
                .as_deref()
                .map(|t| options.filename(&sanitize(Some(t))));
            PlannedPage {
                page: index + 1,
                text,
                filename,
            }
        })
        .collect();

    Ok(ExportPlan { style, pages })
}

/// Export pages one file each, named after their styled text.
pub fn run_export<S, I>(service: &mut S, ui: &mut I, options: &ExportOptions) -> Result<ExportReport>
where
    S: DocumentExportService + ?Sized,
    I: Interaction + ?Sized,
{
    options.validate()?;

    let document_path = service
        .document_path()
        .ok_or(Error::UnsavedDocument)?
        .to_path_buf();
    let style = resolve_style(&service.list_styles(), options.style.as_deref())?;
    let pages = selected_pages(options.pages, service.page_count())?;

    let stem = match options.pages {
        PageSelection::Single(n) => service
            .find_styled_text(n - 1, &style)
            .map(|text| sanitize(Some(text.as_str())).into_string())
            .unwrap_or_else(|| PLACEHOLDER_STEM.to_string()),
        PageSelection::All => PLACEHOLDER_STEM.to_string(),
    };
    let document_folder = folder_of(&document_path);
    let suggested = document_folder.join(options.filename_with_stem(&stem));

    let Some(chosen) = ui.choose_save_location(&suggested, &options.format.file_filter()) else {
        log::info!("Export cancelled");
        return Ok(ExportReport::cancelled(document_folder, style));
    };
    let folder = folder_of(&chosen);

    if !prepare_folder(&folder, ui) {
        log::info!("Export cancelled");
        return Ok(ExportReport::cancelled(folder, style));
    }

    let mut report = ExportReport {
        folder: folder.clone(),
        style: style.clone(),
        ..Default::default()
    };
    let total = pages.len();
    let mut produced = HashSet::new();

    {
        let mut service = PreferencesGuard::new(
            service,
            ServicePreferences {
                interaction: InteractionLevel::Never,
                preflight: options.preflight,
                render: options.render,
            },
        );

        for (done, &index) in pages.iter().enumerate() {
            ui.progress(done, total);
            let number = index + 1;

            let Some(text) = service.find_styled_text(index, &style) else {
                ui.warn(&format!(
                    "No text with paragraph style '{}' found on page {}; skipped",
                    style, number
                ));
                report.skipped.push(number);
                continue;
            };

            let fragment = sanitize(Some(text.as_str()));
            if fragment.is_fallback() {
                ui.warn(&format!(
                    "Text '{}' on page {} has no usable filename characters; named '{}'",
                    text,
                    number,
                    FilenameFragment::FALLBACK
                ));
            }
            let filename = options.filename(&fragment);
            let destination = folder.join(&filename);
            if !produced.insert(filename.clone()) {
                log::warn!(
                    "Page {} overwrites {} written earlier in this run",
                    number,
                    filename
                );
            }

            match service.export_page(index, options.format, &destination) {
                Ok(()) => report.exported.push(ExportedPage {
                    page: number,
                    fragment,
                    path: destination,
                }),
                Err(e) => {
                    ui.warn(&format!("Failed to export page {}: {}", number, e));
                    report.failed.push(PageFailure {
                        page: number,
                        reason: e.to_string(),
                    });
                }
            }
        }
        ui.progress(total, total);
    }

    log::info!(
        "Exported {} of {} page(s) to {} ({} skipped, {} failed)",
        report.exported.len(),
        total,
        folder.display(),
        report.skipped.len(),
        report.failed.len()
    );
    Ok(report)
}

/// Pick the style to name pages by: the requested one (exact match first,
/// then case-insensitive), or the first style.
fn resolve_style(styles: &[String], requested: Option<&str>) -> Result<String> {
    let first = styles.first().ok_or(Error::NoParagraphStyles)?;
    let Some(requested) = requested else {
        return Ok(first.clone());
    };

    let lowered = requested.to_lowercase();
    styles
        .iter()
        .find(|s| s.as_str() == requested)
        .or_else(|| styles.iter().find(|s| s.to_lowercase() == lowered))
        .cloned()
        .ok_or_else(|| Error::StyleNotFound(requested.to_string()))
}

/// 0-based page indices for a selection.
fn selected_pages(selection: PageSelection, count: usize) -> Result<Vec<usize>> {
    match selection {
        PageSelection::All => Ok((0..count).collect()),
        PageSelection::Single(page) if page >= 1 && page <= count => Ok(vec![page - 1]),
        PageSelection::Single(page) => Err(Error::PageOutOfRange { page, count }),
    }
}

fn folder_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Make sure the folder exists and is writable, asking the user how to
/// proceed when it is not. Returns false if the user cancels.
fn prepare_folder<I: Interaction + ?Sized>(folder: &Path, ui: &mut I) -> bool {
    if !folder.exists() {
        if !ui.confirm(&format!(
            "Folder does not exist:\n{}\n\nCreate it?",
            folder.display()
        )) {
            return false;
        }
        match fs::create_dir_all(folder) {
            Ok(()) => log::debug!("Created {}", folder.display()),
            Err(e) => {
                if !ui.confirm(&format!(
                    "Could not create folder {}: {}\n\nContinue anyway?",
                    folder.display(),
                    e
                )) {
                    return false;
                }
            }
        }
    }

    let probe = folder.join(WRITE_PROBE);
    match fs::write(&probe, b"") {
        Ok(()) => {
            if let Err(e) = fs::remove_file(&probe) {
                log::debug!("Could not remove {}: {}", probe.display(), e);
            }
            true
        }
        Err(e) => ui.confirm(&format!(
            "Cannot write to folder {}: {}\n\nContinue anyway?",
            folder.display(),
            e
        )),
    }
}
