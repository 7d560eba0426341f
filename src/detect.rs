//! Format detection for Office Open XML documents.

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

/// Detected Office document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Word document (.docx)
    Docx,
    /// Excel workbook (.xlsx)
    Xlsx,
    /// PowerPoint presentation (.pptx)
    Pptx,
}

impl FormatType {
    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            FormatType::Docx => "Word Document",
            FormatType::Xlsx => "Excel Workbook",
            FormatType::Pptx => "PowerPoint Presentation",
        }
    }

    /// Whether pages of this format can be exported.
    pub fn is_exportable(&self) -> bool {
        matches!(self, FormatType::Docx)
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Detect the format type from a file path.
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<FormatType> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::DocumentNotFound(path.to_path_buf()));
    }
    let mut reader = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 4];
    if reader.read_exact(&mut magic).is_err() || magic != ZIP_MAGIC {
        return Err(Error::UnknownFormat);
    }
    reader.rewind()?;
    detect_format_from_reader(reader)
}

/// Detect the format type from a byte slice.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<FormatType> {
    if data.len() < 4 || data[..4] != ZIP_MAGIC {
        return Err(Error::UnknownFormat);
    }
    detect_format_from_reader(std::io::Cursor::new(data))
}

/// Detect the format type by inspecting `[Content_Types].xml`.
pub fn detect_format_from_reader<R: Read + Seek>(reader: R) -> Result<FormatType> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let content_types = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            decode_xml_bytes(&bytes)?
        }
        Err(_) => return Err(Error::MissingComponent("[Content_Types].xml".to_string())),
    };

    [
        (DOCX_CONTENT_TYPE, FormatType::Docx),
        (XLSX_CONTENT_TYPE, FormatType::Xlsx),
        (PPTX_CONTENT_TYPE, FormatType::Pptx),
    ]
    .into_iter()
    .find(|(content_type, _)| content_types.contains(content_type))
    .map(|(_, format)| format)
    .ok_or(Error::UnknownFormat)
}
