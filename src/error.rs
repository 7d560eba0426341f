//! Error types for the stylesplit library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for stylesplit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a document or exporting its pages.
///
/// The first group aborts a whole export run. Per-page failures are caught
/// by the runner and recorded in the [`ExportReport`](crate::ExportReport)
/// instead of being returned.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input document does not exist.
    #[error("Document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    /// The document has no location on disk, so there is no default
    /// folder to export next to it.
    #[error("Please save your document before exporting")]
    UnsavedDocument,

    /// The file format could not be determined.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required document component is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// The document defines no paragraph styles.
    #[error("No paragraph styles found in document")]
    NoParagraphStyles,

    /// A referenced style was not found.
    #[error("Paragraph style not found: {0}")]
    StyleNotFound(String),

    /// A page number outside the document was requested (1-based).
    #[error("Invalid page number {page}. Please enter a number between 1 and {count}")]
    PageOutOfRange {
        /// Requested page, 1-based.
        page: usize,
        /// Number of pages in the document.
        count: usize,
    },

    /// An export option is not usable.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// The settings file could not be read.
    #[error("Settings error: {0}")]
    Settings(String),

    /// The export destination already exists and overwriting needs
    /// confirmation.
    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    /// Rendering or writing a page failed.
    #[error("Export error: {0}")]
    Export(String),

    /// The rendered output failed the preflight check.
    #[error("Preflight failed: {0}")]
    Preflight(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Settings(err.to_string())
    }
}

#[cfg(feature = "pdf")]
impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Export(format!("PDF: {}", err))
    }
}

#[cfg(feature = "raster")]
impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Export(format!("image: {}", err))
    }
}
