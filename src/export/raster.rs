//! JPEG and PNG proofs via the image crate.
//!
//! Text is greeked: each word is drawn as a bar the width of its estimated
//! glyph run, which is enough to check layout and page assignment.

use super::layout::{split_sheets, wrap_page, PageGeometry, TextLine};
use super::{ExportFormat, RenderSettings};
use crate::error::{Error, Result};
use crate::model::Page;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

const PAPER: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([96, 96, 96]);
const INK_BOLD: Rgb<u8> = Rgb([32, 32, 32]);

/// Render the first sheet of a page as a JPEG or PNG.
pub fn render_raster(
    page: &Page,
    format: ExportFormat,
    settings: &RenderSettings,
    geometry: &PageGeometry,
) -> Result<Vec<u8>> {
    let sheets = split_sheets(wrap_page(page, geometry), geometry);
    if sheets.len() > 1 {
        log::warn!(
            "Page {} needs {} sheets; the image shows the first",
            page.number(),
            sheets.len()
        );
    }

    let scale = settings.resolution as f32 / 72.0;
    let width = (geometry.width * scale).round().max(1.0) as u32;
    let height = (geometry.height * scale).round().max(1.0) as u32;
    let mut img = RgbImage::from_pixel(width, height, PAPER);

    if let Some(sheet) = sheets.first() {
        draw_sheet(&mut img, sheet, geometry, scale);
    }

    let mut bytes = Vec::new();
    match format {
        ExportFormat::Png => {
            img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        }
        ExportFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut bytes, settings.jpeg_quality);
            img.write_with_encoder(encoder)?;
        }
        ExportFormat::Pdf => {
            return Err(Error::UnsupportedFormat(
                "PDF is not a raster format".to_string(),
            ))
        }
    }
    Ok(bytes)
}

/// Decode rendered bytes and return the image dimensions.
pub fn verify_raster(bytes: &[u8]) -> Result<(u32, u32)> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| Error::Preflight(format!("image does not decode: {}", e)))?;
    match (img.width(), img.height()) {
        (0, _) | (_, 0) => Err(Error::Preflight("image is empty".to_string())),
        dims => Ok(dims),
    }
}

fn draw_sheet(img: &mut RgbImage, lines: &[TextLine], geometry: &PageGeometry, scale: f32) {
    let mut y = geometry.margin;

    for line in lines {
        y += line.height();
        let glyph = line.font_size * 0.5;
        let bar_height = line.font_size * 0.6;
        let color = if line.bold { INK_BOLD } else { INK };

        let mut column = 0usize;
        for (i, word) in line.text.split(' ').enumerate() {
            if i > 0 {
                column += 1;
            }
            let len = word.chars().count();
            if len > 0 {
                let x0 = geometry.margin + column as f32 * glyph;
                fill_rect(
                    img,
                    x0 * scale,
                    (y - bar_height) * scale,
                    len as f32 * glyph * scale,
                    bar_height * scale,
                    color,
                );
            }
            column += len;
        }
    }
}

fn fill_rect(img: &mut RgbImage, x: f32, y: f32, w: f32, h: f32, color: Rgb<u8>) {
    let x0 = x.max(0.0) as u32;
    let y0 = y.max(0.0) as u32;
    let x1 = ((x + w).max(0.0) as u32).min(img.width());
    let y1 = ((y + h).max(0.0) as u32).min(img.height());
    for py in y0..y1 {
        for px in x0..x1 {
            img.put_pixel(px, py, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Paragraph;

    fn sample_page() -> Page {
        let mut page = Page::new(0);
        page.add_paragraph(Paragraph::with_text("Fresh Apples"));
        page.add_paragraph(Paragraph::with_text("Picked this morning"));
        page
    }

    #[test]
    fn test_png_at_default_resolution() {
        let bytes = render_raster(
            &sample_page(),
            ExportFormat::Png,
            &RenderSettings::default(),
            &PageGeometry::A4,
        )
        .unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
        assert_eq!(verify_raster(&bytes).unwrap(), (595, 842));
    }

    #[test]
    fn test_jpeg_scales_with_resolution() {
        let settings = RenderSettings::default().with_resolution(144);
        let bytes =
            render_raster(&sample_page(), ExportFormat::Jpeg, &settings, &PageGeometry::A4)
                .unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8]));
        assert_eq!(verify_raster(&bytes).unwrap(), (1190, 1684));
    }

    #[test]
    fn test_text_is_drawn() {
        let bytes = render_raster(
            &sample_page(),
            ExportFormat::Png,
            &RenderSettings::default(),
            &PageGeometry::A4,
        )
        .unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert!(img.pixels().any(|p| *p == INK));
    }

    #[test]
    fn test_pdf_is_rejected() {
        let result = render_raster(
            &sample_page(),
            ExportFormat::Pdf,
            &RenderSettings::default(),
            &PageGeometry::A4,
        );
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(matches!(verify_raster(b"nope"), Err(Error::Preflight(_))));
    }
}
