//! PDF output via lopdf.

use super::layout::{split_sheets, wrap_page, PageGeometry, TextLine};
use crate::error::{Error, Result};
use crate::model::Page;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

const PRODUCER: &str = concat!("stylesplit ", env!("CARGO_PKG_VERSION"));

/// Render one document page as a standalone PDF.
///
/// Text that does not fit on one A4 sheet continues on further sheets of
/// the same file.
pub fn render_pdf(page: &Page, title: &str, geometry: &PageGeometry) -> Result<Vec<u8>> {
    let sheets = split_sheets(wrap_page(page, geometry), geometry);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(font("Helvetica"));
    let bold = doc.add_object(font("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(sheets.len());
    for sheet in &sheets {
        let content = sheet_content(sheet, geometry);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), geometry.width.into(), geometry.height.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = info(&mut doc, title);
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Re-open rendered bytes and return the number of pages.
pub fn verify_pdf(bytes: &[u8]) -> Result<usize> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| Error::Preflight(format!("PDF does not load: {}", e)))?;
    match doc.get_pages().len() {
        0 => Err(Error::Preflight("PDF has no pages".to_string())),
        n => Ok(n),
    }
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn info(doc: &mut Document, title: &str) -> ObjectId {
    // Text strings outside PDFDocEncoding are stored as UTF-16BE with a BOM.
    let mut utf16 = vec![0xFE, 0xFF];
    for unit in title.encode_utf16() {
        utf16.extend_from_slice(&unit.to_be_bytes());
    }
    doc.add_object(dictionary! {
        "Title" => Object::String(utf16, StringFormat::Hexadecimal),
        "Producer" => Object::string_literal(PRODUCER),
    })
}

fn sheet_content(lines: &[TextLine], geometry: &PageGeometry) -> Content {
    let mut operations = Vec::new();
    let mut y = geometry.height - geometry.margin;

    for line in lines {
        y -= line.height();
        if line.text.is_empty() {
            continue;
        }
        let font = if line.bold { "F2" } else { "F1" };
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec![font.into(), line.font_size.into()]));
        operations.push(Operation::new(
            "Td",
            vec![geometry.margin.into(), y.into()],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(&line.text), StringFormat::Literal)],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    Content { operations }
}

/// Encode text for a WinAnsiEncoding font; unmappable characters become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => b'?',
        })
        .collect()
}
