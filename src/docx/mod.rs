//! DOCX (Word) document parser.
//!
//! Reads paragraph styles and splits the body into pages at explicit
//! page and section breaks.

mod parser;
pub mod styles;

pub use parser::DocxParser;
pub use styles::StyleMap;
