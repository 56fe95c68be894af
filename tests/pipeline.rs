//! # Pipeline Tests
//!
//! End-to-end checks from design to packaged output, using in-memory
//! templates, the built-in bitmap face and the bundled Tuffy fixture, so no
//! installed fonts are needed.
//!
//! ## Test Coverage
//!
//! - **Rendering**: byte-identical re-renders, name substitution, static
//!   text, per-attendee adjustments
//! - **Batching**: preconditions, roster order under parallel rendering
//! - **Packaging**: ZIP entry order and naming, PDF page count, PDF page
//!   order checked against single renders
//! - **Project inputs**: stored designer state and project files on disk

use certforge::CertError;
use certforge::batch::GenerateOptions;
use certforge::config::{PackageConfig, PdfImageEncoding, RenderConfig};
use certforge::design::{Design, Roster, StoredState, TextElement};
use certforge::font::FontRegistry;
use certforge::geometry::PreviewSize;
use certforge::package::{self, PackageFormat};
use certforge::project::{Project, ProjectFile};
use certforge::render::encode::flatten_rgb;
use certforge::render::{Rasterizer, Template};
use base64::Engine;
use image::{Rgba, RgbaImage};
use std::io::{Cursor, Read};
use std::path::PathBuf;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn blank_template(width: u32, height: u32) -> Template {
    Template::from_image(RgbaImage::from_pixel(width, height, Rgba([250, 248, 240, 255]))).unwrap()
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbaImage::from_pixel(width, height, Rgba([250, 248, 240, 255]))
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn certificate_design() -> Design {
    let mut design = Design::new();
    let mut title = TextElement::static_text("Certificate of Attendance", 40.0, 30.0);
    title.font_size = 28.0;
    design.push(title);
    design.push(TextElement::name_placeholder(40.0, 200.0));
    design
}

fn project(names: &[&str]) -> Project {
    Project::new(
        Some(blank_template(600, 300)),
        certificate_design(),
        Roster::new(names.iter().copied()),
    )
}

fn zip_entry_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Raw RGB samples of the image drawn on `page` (1-based).
fn page_image_rgb(doc: &lopdf::Document, page: u32) -> Vec<u8> {
    let page_id = doc.get_pages()[&page];
    let image_id = doc
        .get_dictionary(page_id)
        .unwrap()
        .get(b"Resources")
        .and_then(lopdf::Object::as_dict)
        .and_then(|r| r.get(b"XObject"))
        .and_then(lopdf::Object::as_dict)
        .and_then(|x| x.get(b"Im0"))
        .and_then(lopdf::Object::as_reference)
        .unwrap();
    let stream = doc.get_object(image_id).and_then(lopdf::Object::as_stream).unwrap();

    if stream.dict.get(b"Filter").is_err() {
        return stream.content.clone();
    }
    let mut raw = Vec::new();
    flate2::read::ZlibDecoder::new(stream.content.as_slice())
        .read_to_end(&mut raw)
        .unwrap();
    raw
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("certforge-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// ============================================================================
// RENDERING
// ============================================================================

#[test]
fn test_rendering_twice_is_byte_identical() {
    let p = project(&["Ada Lovelace"]);
    let a = p.render_preview(0).unwrap();
    let b = p.render_preview(0).unwrap();
    assert_eq!(a.image.bytes, b.image.bytes);
    assert_eq!((a.image.width, a.image.height), (600, 300));
}

#[test]
fn test_name_element_shows_attendee_not_literal_text() {
    let template = blank_template(600, 300);
    let preview = PreviewSize::fit_height(template.size(), 500.0);
    let registry = FontRegistry::new();
    let config = RenderConfig::default();
    let raster = Rasterizer::new(&registry, &config);

    let mut name = TextElement::name_placeholder(40.0, 40.0);
    name.text = "LITERAL".into();
    let literal = TextElement::static_text("Grace", 40.0, 40.0);

    let (as_name, _) = raster.compose(Some(&template), &[name], preview, "Grace").unwrap();
    let (as_static, _) = raster.compose(Some(&template), &[literal], preview, "Grace").unwrap();
    assert_eq!(as_name, as_static);
}

#[test]
fn test_static_text_is_identical_for_every_attendee() {
    let template = blank_template(600, 300);
    let preview = PreviewSize::fit_height(template.size(), 500.0);
    let registry = FontRegistry::new();
    let config = RenderConfig::default();
    let raster = Rasterizer::new(&registry, &config);
    let elements = [TextElement::static_text("Workshop 2024", 40.0, 40.0)];

    let (ada, _) = raster.compose(Some(&template), &elements, preview, "Ada").unwrap();
    let (grace, _) = raster.compose(Some(&template), &elements, preview, "Grace").unwrap();
    assert_eq!(ada, grace);
}

#[test]
fn test_adjustment_only_moves_its_attendee() {
    let mut adjusted = certificate_design();
    let name_id = adjusted.elements()[1].id.clone();
    assert!(adjusted.set_adjustment(&name_id, "Jane Smith", 15.0, -10.0));

    let plain = Project::new(
        Some(blank_template(600, 300)),
        certificate_design(),
        Roster::new(["John Doe", "Jane Smith"]),
    );
    let nudged = Project::new(
        Some(blank_template(600, 300)),
        adjusted,
        Roster::new(["John Doe", "Jane Smith"]),
    );

    assert_eq!(
        plain.render_preview(0).unwrap().image.bytes,
        nudged.render_preview(0).unwrap().image.bytes,
    );
    assert_ne!(
        plain.render_preview(1).unwrap().image.bytes,
        nudged.render_preview(1).unwrap().image.bytes,
    );
}

#[test]
fn test_long_unbroken_name_is_not_truncated() {
    let p = project(&["Wolfeschlegelsteinhausenbergerdorffvoralternwarengewissenhaftschaferswessenschafewarenwohlgepflegeundsorgfaltigkeitbeschutzen"]);
    let cert = p.render_preview(0).unwrap();
    assert!(cert.skipped.is_empty());
}

#[test]
fn test_custom_font_file_is_used_for_text() {
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/Tuffy.ttf");
    let mut registry = FontRegistry::new();
    assert_eq!(registry.register_font_file(&fixture).unwrap(), "Tuffy");

    let mut design = Design::new();
    let mut name = TextElement::name_placeholder(40.0, 120.0);
    name.font_family = "Tuffy".into();
    name.font_size = 40.0;
    design.push(name);

    let outlined = Project::new(Some(blank_template(600, 300)), design.clone(), Roster::new(["Ada"]))
        .with_registry(registry);
    let fallback = Project::new(Some(blank_template(600, 300)), design, Roster::new(["Ada"]));

    let cert = outlined.render_preview(0).unwrap();
    assert!(cert.skipped.is_empty());
    assert_ne!(cert.image.bytes, fallback.render_preview(0).unwrap().image.bytes);
}

// ============================================================================
// BATCHING
// ============================================================================

#[test]
fn test_batch_preconditions() {
    let empty = project(&[]);
    assert!(matches!(
        empty.generate(&GenerateOptions::default()),
        Err(CertError::PreconditionFailed(_))
    ));

    let mut no_name = Design::new();
    no_name.push(TextElement::static_text("Certificate", 10.0, 10.0));
    let p = Project::new(Some(blank_template(600, 300)), no_name, Roster::new(["Ada"]));
    assert!(matches!(
        p.generate(&GenerateOptions::default()),
        Err(CertError::PreconditionFailed(_))
    ));

    let no_template = Project::new(None, certificate_design(), Roster::new(["Ada"]));
    assert!(matches!(
        no_template.generate(&GenerateOptions::default()),
        Err(CertError::TemplateUnavailable(_))
    ));
}

// ============================================================================
// PACKAGING
// ============================================================================

#[test]
fn test_zip_entries_follow_roster_order() {
    let p = project(&["Charlie", "Alice", "Bob", "Dana", "Eve", "Frank"]);
    let (package, outcome) = p
        .package(PackageFormat::Zip, &GenerateOptions::default())
        .unwrap();

    assert_eq!(outcome.summary(), "generated 6 of 6 certificates");
    assert_eq!(
        zip_entry_names(&package.bytes),
        vec![
            "certificate_Charlie.png",
            "certificate_Alice.png",
            "certificate_Bob.png",
            "certificate_Dana.png",
            "certificate_Eve.png",
            "certificate_Frank.png",
        ]
    );
}

#[test]
fn test_zip_entry_matches_single_render() {
    let p = project(&["Ada", "Grace"]);
    let (package, _) = p
        .package(PackageFormat::Zip, &GenerateOptions::default())
        .unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(package.bytes)).unwrap();
    let mut stored = Vec::new();
    archive
        .by_name("certificate_Grace.png")
        .unwrap()
        .read_to_end(&mut stored)
        .unwrap();
    assert_eq!(stored, p.render_preview(1).unwrap().image.bytes);
}

#[test]
fn test_duplicate_names_keep_both_entries() {
    let p = project(&["John", "John"]);
    let (package, _) = p
        .package(PackageFormat::Zip, &GenerateOptions::default())
        .unwrap();

    let names = zip_entry_names(&package.bytes);
    assert_eq!(names.len(), 2);
    assert_ne!(names[0], names[1]);
}

#[test]
fn test_pdf_has_one_page_per_attendee() {
    let p = project(&["Ada", "Grace", "Edsger"]);
    let (package, _) = p
        .package(PackageFormat::Pdf, &GenerateOptions::sequential())
        .unwrap();

    assert_eq!(package.filename, "Certificates.pdf");
    let doc = lopdf::Document::load_mem(&package.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
}

#[test]
fn test_pdf_pages_follow_roster_order() {
    let mut p = project(&["A", "B", "C"]);
    p.package.pdf_image = PdfImageEncoding::Flate;
    let (package, _) = p
        .package(PackageFormat::Pdf, &GenerateOptions::default())
        .unwrap();
    let doc = lopdf::Document::load_mem(&package.bytes).unwrap();

    let mut pages = Vec::new();
    for n in 1..=3u32 {
        let single = p.render_preview(n as usize - 1).unwrap();
        let expected = flatten_rgb(&image::load_from_memory(&single.image.bytes).unwrap().to_rgba8());
        let stored = page_image_rgb(&doc, n);
        assert_eq!(stored, expected.into_raw(), "page {} is not attendee #{}", n, n);
        pages.push(stored);
    }
    assert_ne!(pages[0], pages[1]);
    assert_ne!(pages[1], pages[2]);
}

#[test]
fn test_packaging_nothing_fails() {
    for format in [PackageFormat::Zip, PackageFormat::Pdf] {
        let err = package::package(&[], format, &PackageConfig::default()).unwrap_err();
        assert!(matches!(err, CertError::NothingToPackage));
    }
}

// ============================================================================
// PROJECT INPUTS
// ============================================================================

#[test]
fn test_project_from_stored_state() {
    let uri = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png_bytes(300, 150))
    );
    let state = StoredState {
        certificate_image_url: Some(uri),
        attendee_list: Some("Ada\nGrace\n\n".into()),
        custom_fonts: Some("{}".into()),
    };

    let p = Project::from_stored(&state, certificate_design()).unwrap();
    assert_eq!(p.roster.len(), 2);
    let outcome = p.generate(&GenerateOptions::default()).unwrap();
    assert_eq!(outcome.succeeded(), 2);
    assert_eq!(outcome.certificates[0].image.width, 300);
}

#[test]
fn test_project_file_on_disk() {
    let dir = scratch_dir("project-file");
    std::fs::write(dir.join("template.png"), png_bytes(400, 200)).unwrap();
    std::fs::write(dir.join("attendees.txt"), "Ada Lovelace\n  \nAlan Turing\n").unwrap();

    let file = ProjectFile {
        template: Some(PathBuf::from("template.png")),
        roster: Some(PathBuf::from("attendees.txt")),
        elements: certificate_design(),
        ..Default::default()
    };
    let path = dir.join("project.json");
    file.save(&path).unwrap();

    let p = Project::load(&path).unwrap();
    assert_eq!(p.roster.names(), ["Ada Lovelace", "Alan Turing"]);
    assert_eq!(p.design, file.elements);

    let cert = p.render_preview(1).unwrap();
    assert_eq!(cert.suggested_filename(), "certificate_Alan Turing.png");
    assert_eq!((cert.image.width, cert.image.height), (400, 200));

    std::fs::remove_dir_all(&dir).ok();
}

