//! End-to-end export tests on synthetic Word documents.
//!
//! Each test writes a minimal DOCX package into a temporary folder, opens
//! it as an export service and runs the full export loop.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use stylesplit::{
    open_for_export, plan_export, run_export, DocumentExportService, DocxExportService, Error, ExportFormat,
    ExportOptions, FileFilter, Interaction,
};
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
    <w:style w:type="paragraph" w:styleId="ProductName">
        <w:name w:val="Product Name"/>
        <w:pPr><w:pageBreakBefore/><w:outlineLvl w:val="0"/></w:pPr>
    </w:style>
    <w:style w:type="character" w:styleId="Strong"><w:name w:val="Strong"/></w:style>
</w:styles>"#;

const CORE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Market Catalog</dc:title>
    <dc:creator>Produce Team</dc:creator>
</cp:coreProperties>"#;

fn product(name: &str, body: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="ProductName"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>
           <w:p><w:r><w:t>{}</w:t></w:r></w:p>"#,
        name, body
    )
}

fn write_docx(dir: &Path, name: &str, body: &str) -> PathBuf {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr/></w:body></w:document>"#,
        body
    );

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (part, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("word/document.xml", document.as_str()),
        ("word/styles.xml", STYLES),
        ("docProps/core.xml", CORE),
    ] {
        zip.start_file(part, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    let bytes = zip.finish().unwrap().into_inner();

    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn catalog(dir: &Path) -> PathBuf {
    let body = [
        product("Fresh Apples", "Crisp and sweet."),
        product("Pears &amp; Plums", "Stone fruit, mostly."),
        "<w:p><w:pPr><w:pageBreakBefore/></w:pPr><w:r><w:t>Notes page</w:t></w:r></w:p>".to_string(),
        product("Café — Beans 100%", "Roasted weekly."),
    ]
    .concat();
    write_docx(dir, "catalog.docx", &body)
}

/// Saves wherever it is told to and says yes to everything.
struct Accepting {
    folder: PathBuf,
    suggested: Option<PathBuf>,
    warnings: usize,
}

impl Accepting {
    fn into(folder: &Path) -> Self {
        Self {
            folder: folder.to_path_buf(),
            suggested: None,
            warnings: 0,
        }
    }
}

impl Interaction for Accepting {
    fn choose_save_location(&mut self, suggested: &Path, _: &FileFilter) -> Option<PathBuf> {
        self.suggested = Some(suggested.to_path_buf());
        Some(self.folder.join(suggested.file_name()?))
    }

    fn confirm(&mut self, _: &str) -> bool {
        true
    }

    fn warn(&mut self, _: &str) {
        self.warnings += 1;
    }
}

fn exported_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_pages_follow_style_breaks() {
    let dir = tempfile::tempdir().unwrap();
    let service = DocxExportService::open(catalog(dir.path())).unwrap();

    assert_eq!(service.page_count(), 4);
    assert_eq!(service.list_styles(), vec!["Normal", "Product Name"]);
    assert_eq!(
        service.find_styled_text(3, "Product Name").as_deref(),
        Some("Café — Beans 100%")
    );
    assert_eq!(service.document().metadata.title.as_deref(), Some("Market Catalog"));
}

#[cfg(feature = "pdf")]
#[test]
fn test_export_all_pages_as_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let mut service = DocxExportService::open(catalog(dir.path())).unwrap();
    let mut ui = Accepting::into(&out);

    let options = ExportOptions::new()
        .with_style("Product Name")
        .with_prefix("2025-")
        .with_suffix("-Market-Sheet")
        .with_preflight(true);
    let report = run_export(&mut service, &mut ui, &options).unwrap();

    assert_eq!(
        ui.suggested.unwrap(),
        dir.path()
            .canonicalize()
            .unwrap()
            .join("2025-temp-Market-Sheet.pdf")
    );
    assert_eq!(report.exported.len(), 3);
    assert_eq!(report.skipped, vec![3]);
    assert!(report.failed.is_empty());
    assert_eq!(ui.warnings, 1);

    assert_eq!(
        exported_names(&out),
        vec![
            "2025-Caf-Beans-100pct-Market-Sheet.pdf",
            "2025-Fresh-Apples-Market-Sheet.pdf",
            "2025-Pears-and-Plums-Market-Sheet.pdf",
        ]
    );
    let bytes = fs::read(out.join("2025-Fresh-Apples-Market-Sheet.pdf")).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[cfg(feature = "raster")]
#[test]
fn test_export_single_page_as_png() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = DocxExportService::open(catalog(dir.path())).unwrap();
    let mut ui = Accepting::into(dir.path());

    let options = ExportOptions::new()
        .with_style("product name")
        .with_page(2)
        .with_format(ExportFormat::Png);
    let report = run_export(&mut service, &mut ui, &options).unwrap();

    assert_eq!(report.exported.len(), 1);
    assert_eq!(report.exported[0].page, 2);
    let path = dir.path().join("Pears-and-Plums.png");
    assert_eq!(
        ui.suggested.unwrap().file_name().unwrap(),
        "Pears-and-Plums.png"
    );
    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (595, 842));
}

#[cfg(feature = "raster")]
#[test]
fn test_render_options_apply_to_exported_images() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = open_for_export(catalog(dir.path())).unwrap();
    let mut ui = Accepting::into(dir.path());

    let options = ExportOptions::new()
        .with_style("Product Name")
        .with_page(1)
        .with_format(ExportFormat::Png)
        .with_resolution(36);
    run_export(&mut service, &mut ui, &options).unwrap();

    let img = image::open(dir.path().join("Fresh-Apples.png")).unwrap();
    assert_eq!(img.width(), 298);
    assert_eq!(service.preferences().render.resolution, 72);
}

#[cfg(feature = "pdf")]
#[test]
fn test_existing_files_are_overwritten_during_run() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    fs::write(out.join("Fresh-Apples.pdf"), b"stale").unwrap();

    let mut service = DocxExportService::open(catalog(dir.path())).unwrap();
    let mut ui = Accepting::into(&out);
    let options = ExportOptions::new().with_style("Product Name").with_page(1);

    run_export(&mut service, &mut ui, &options).unwrap();
    assert!(fs::read(out.join("Fresh-Apples.pdf")).unwrap().starts_with(b"%PDF"));
}

#[test]
fn test_unknown_style_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = DocxExportService::open(catalog(dir.path())).unwrap();
    let mut ui = Accepting::into(dir.path());

    let err = run_export(
        &mut service,
        &mut ui,
        &ExportOptions::new().with_style("Price"),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Paragraph style not found: Price");
    assert!(ui.suggested.is_none());
}

#[test]
fn test_document_without_styles_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("[Content_Types].xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();
    zip.start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(
        br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>x</w:t></w:r></w:p></w:body></w:document>"#,
    )
    .unwrap();
    let path = dir.path().join("plain.docx");
    fs::write(&path, zip.finish().unwrap().into_inner()).unwrap();

    let mut service = DocxExportService::open(&path).unwrap();
    let err = run_export(
        &mut service,
        &mut Accepting::into(dir.path()),
        &ExportOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::NoParagraphStyles));
}

#[test]
fn test_missing_document() {
    let err = DocxExportService::open("no/such/catalog.docx").unwrap_err();
    assert!(matches!(err, Error::DocumentNotFound(_)));
}

#[test]
fn test_preview_plan() {
    let dir = tempfile::tempdir().unwrap();
    let service = DocxExportService::open(catalog(dir.path())).unwrap();

    let plan = plan_export(
        &service,
        &ExportOptions::new()
            .with_style("Product Name")
            .with_format(ExportFormat::Jpeg),
    )
    .unwrap();

    let names: Vec<_> = plan.pages.iter().map(|p| p.filename.as_deref()).collect();
    assert_eq!(
        names,
        vec![
            Some("Fresh-Apples.jpg"),
            Some("Pears-and-Plums.jpg"),
            None,
            Some("Caf-Beans-100pct.jpg"),
        ]
    );
    assert_eq!(exported_names(dir.path()), vec!["catalog.docx"]);
}

#[test]
fn test_unsaved_document_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = fs::read(catalog(dir.path())).unwrap();
    let mut service = DocxExportService::from_bytes(bytes).unwrap();

    let err = run_export(
        &mut service,
        &mut Accepting::into(dir.path()),
        &ExportOptions::new(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Please save your document before exporting");
}
