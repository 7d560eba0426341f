//! The document export service seam.

use super::{ExportFormat, RenderSettings};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::path::Path;

/// How the service may interact with the user while exporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionLevel {
    /// Ask before destructive actions; existing files are not overwritten
    #[default]
    Interactive,
    /// Never ask; existing files are overwritten
    Never,
}

/// Service-wide preferences that an export run temporarily changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePreferences {
    /// Whether the service may prompt or must act silently
    pub interaction: InteractionLevel,
    /// Verify rendered output before writing it
    pub preflight: bool,
    /// Resolution and quality of rendered pages
    pub render: RenderSettings,
}

impl Default for ServicePreferences {
    fn default() -> Self {
        Self {
            interaction: InteractionLevel::Interactive,
            preflight: true,
            render: RenderSettings::default(),
        }
    }
}

/// Access to an open document for per-page export.
///
/// Pages are addressed by 0-based index; user-facing messages use
/// 1-based numbers.
pub trait DocumentExportService {
    /// Where the document is saved, or `None` if it never was.
    fn document_path(&self) -> Option<&Path>;

    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Paragraph style names in document order.
    fn list_styles(&self) -> Vec<String>;

    /// Text of the first paragraph on `page` carrying `style`.
    fn find_styled_text(&self, page: usize, style: &str) -> Option<String>;

    /// Render one page and write it to `destination`.
    fn export_page(&mut self, page: usize, format: ExportFormat, destination: &Path)
        -> Result<()>;

    /// Current service-wide preferences.
    fn preferences(&self) -> ServicePreferences;

    /// Replace the service-wide preferences.
    fn set_preferences(&mut self, preferences: ServicePreferences);
}

/// Applies temporary preferences to a service and restores the previous
/// ones when dropped.
pub struct PreferencesGuard<'a, S: DocumentExportService + ?Sized> {
    service: &'a mut S,
    saved: ServicePreferences,
}

impl<'a, S: DocumentExportService + ?Sized> PreferencesGuard<'a, S> {
    /// Save the service's current preferences and apply `temporary`.
    pub fn new(service: &'a mut S, temporary: ServicePreferences) -> Self {
        let saved = service.preferences();
        service.set_preferences(temporary);
        log::debug!("Preferences set to {:?} (saved {:?})", temporary, saved);
        Self { service, saved }
    }

    /// Preferences that will be restored.
    pub fn saved(&self) -> ServicePreferences {
        self.saved
    }
}

impl<S: DocumentExportService + ?Sized> Deref for PreferencesGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.service
    }
}

impl<S: DocumentExportService + ?Sized> DerefMut for PreferencesGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.service
    }
}

impl<S: DocumentExportService + ?Sized> Drop for PreferencesGuard<'_, S> {
    fn drop(&mut self) {
        self.service.set_preferences(self.saved);
        log::debug!("Preferences restored to {:?}", self.saved);
    }
}
