//! Saved export settings.

use super::{ExportFormat, ExportOptions};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Export settings loaded from a JSON file.
///
/// Only the fields present in the file are applied; everything else keeps
/// the value it already has in the [`ExportOptions`] it is applied to.
///
/// ```json
/// { "style": "Product Name", "suffix": "-Market-Sheet", "format": "png" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ExportFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preflight: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jpeg_quality: Option<u8>,
}

impl ExportSettings {
    /// Load settings from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply the present fields on top of `options`.
    pub fn apply(&self, mut options: ExportOptions) -> ExportOptions {
        if let Some(ref style) = self.style {
            options = options.with_style(style.clone());
        }
        if let Some(page) = self.page {
            options = options.with_page(page);
        }
        if let Some(ref prefix) = self.prefix {
            options = options.with_prefix(prefix.clone());
        }
        if let Some(ref suffix) = self.suffix {
            options = options.with_suffix(suffix.clone());
        }
        if let Some(format) = self.format {
            options = options.with_format(format);
        }
        if let Some(preflight) = self.preflight {
            options = options.with_preflight(preflight);
        }
        if let Some(ppi) = self.resolution {
            options = options.with_resolution(ppi);
        }
        if let Some(quality) = self.jpeg_quality {
            options = options.with_jpeg_quality(quality);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::export::PageSelection;

    #[test]
    fn test_partial_settings_apply() {
        let settings =
            ExportSettings::from_json(r#"{"suffix": "-Sheet", "format": "jpeg", "jpeg_quality": 120}"#)
                .unwrap();
        let opts = settings.apply(ExportOptions::new().with_prefix("2025-"));

        assert_eq!(opts.prefix, "2025-");
        assert_eq!(opts.suffix, "-Sheet");
        assert_eq!(opts.format, ExportFormat::Jpeg);
        assert_eq!(opts.render.jpeg_quality, 100);
        assert_eq!(opts.pages, PageSelection::All);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ExportSettings::from_json(r#"{"sufix": "-Sheet"}"#).unwrap_err();
        assert!(matches!(err, Error::Settings(_)));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"style": "Title", "page": 2}"#).unwrap();

        let settings = ExportSettings::from_path(&path).unwrap();
        assert_eq!(settings.style.as_deref(), Some("Title"));
        assert_eq!(settings.page, Some(2));
    }

    #[test]
    fn test_empty_settings_serialize_empty() {
        assert_eq!(serde_json::to_string(&ExportSettings::default()).unwrap(), "{}");
    }
}
