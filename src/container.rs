//! ZIP container access for OOXML packages.

use crate::error::{Error, Result};
use crate::model::Metadata;
use std::cell::RefCell;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

/// Rewrite a UTF-16 encoding declaration after the content was decoded.
///
/// quick-xml honours the declaration, so a decoded string that still claims
/// UTF-16 would be decoded a second time.
fn fix_xml_encoding_declaration(content: &str) -> String {
    if let Some(rest) = content.strip_prefix("<?xml") {
        if let Some(end) = rest.find("?>") {
            let decl = &rest[..end];
            let body = &rest[end..];
            let fixed = ["\"UTF-16\"", "'UTF-16'", "\"utf-16\"", "'utf-16'"]
                .iter()
                .fold(decl.to_string(), |acc, enc| acc.replace(enc, "\"UTF-8\""));
            return format!("<?xml{}{}", fixed, body);
        }
    }
    content.to_string()
}

fn utf16_units(bytes: &[u8], little_endian: bool) -> impl Iterator<Item = u16> + '_ {
    bytes.chunks_exact(2).map(move |pair| {
        if little_endian {
            u16::from_le_bytes([pair[0], pair[1]])
        } else {
            u16::from_be_bytes([pair[0], pair[1]])
        }
    })
}

fn decode_utf16(bytes: &[u8], little_endian: bool) -> Result<String> {
    char::decode_utf16(utf16_units(bytes, little_endian))
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Decode an XML part, honouring a UTF-8 or UTF-16 byte order mark.
///
/// Parts without a BOM are read as UTF-8, with a UTF-16 guess based on
/// interleaved NUL bytes and a lossy fallback.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8(rest.to_vec())
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))),
        [0xFF, 0xFE, rest @ ..] => Ok(fix_xml_encoding_declaration(&decode_utf16(rest, true)?)),
        [0xFE, 0xFF, rest @ ..] => Ok(fix_xml_encoding_declaration(&decode_utf16(rest, false)?)),
        _ => match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(_) if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 => {
                decode_utf16(bytes, true)
            }
            Err(_) if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 => {
                decode_utf16(bytes, false)
            }
            Err(_) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
    }
}

/// An OOXML package opened from disk or memory.
pub struct OoxmlContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl OoxmlContainer {
    /// Open a package from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use stylesplit::container::OoxmlContainer;
    ///
    /// let container = OoxmlContainer::open("merged.docx")?;
    /// assert!(container.exists("word/document.xml"));
    /// # Ok::<(), stylesplit::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::DocumentNotFound(path.to_path_buf()));
        }
        Self::from_bytes(fs::read(path)?)
    }

    /// Open a package held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Read an XML part as a string.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        decode_xml_bytes(&bytes)
    }

    /// Check whether a part exists.
    pub fn exists(&self, path: &str) -> bool {
        self.archive.borrow().file_names().any(|n| n == path)
    }

    /// List all part names.
    pub fn list_files(&self) -> Vec<String> {
        self.archive.borrow().file_names().map(String::from).collect()
    }

    /// Parse core metadata from `docProps/core.xml`.
    ///
    /// A missing or unreadable part yields empty metadata.
    pub fn parse_core_metadata(&self) -> Result<Metadata> {
        let mut meta = Metadata::default();

        let Ok(xml) = self.read_xml("docProps/core.xml") else {
            return Ok(meta);
        };

        let mut reader = quick_xml::Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut current: Option<Vec<u8>> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(e)) => {
                    current = Some(e.name().local_name().as_ref().to_vec());
                }
                Ok(quick_xml::events::Event::Text(e)) => {
                    let text = e.unescape().unwrap_or_default().to_string();
                    match current.as_deref() {
                        Some(b"title") => meta.title = Some(text),
                        Some(b"creator") => meta.author = Some(text),
                        Some(b"subject") => meta.subject = Some(text),
                        Some(b"created") => meta.created = Some(text),
                        Some(b"modified") => meta.modified = Some(text),
                        _ => {}
                    }
                }
                Ok(quick_xml::events::Event::End(_)) => current = None,
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => {
                    log::debug!("ignoring malformed docProps/core.xml: {}", e);
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(meta)
    }
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("files", &self.list_files().len())
            .finish()
    }
}
