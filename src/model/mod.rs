//! Format-agnostic page model.
//!
//! Parsers turn format-specific XML into these structures; the export
//! service looks up styled text and renders pages from them.

mod document;
mod paragraph;

pub use document::*;
pub use paragraph::*;
