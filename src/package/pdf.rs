//! PDF packaging: one certificate per page.
//!
//! ```text
//! page size: configured paper, rotated per image
//!   landscape image (w > h) ──► landscape page
//!   otherwise               ──► portrait page
//!
//! image fit: scale = min(page_w / img_w, page_h / img_h)
//!            centered on both axes
//! ```
//!
//! No Info dictionary or document ID is written, so output depends only on
//! the certificates.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::io::Write;

use crate::config::{PackageConfig, PageSize, PdfImageEncoding};
use crate::error::{CertError, Result};
use crate::render::RenderedCertificate;
use crate::render::encode::flatten_rgb;

const POINTS_PER_MM: f32 = 72.0 / 25.4;

fn pdf_error(e: lopdf::Error) -> CertError {
    CertError::Package(format!("pdf: {}", e))
}

/// Page size in points for an image of `width` × `height` pixels.
pub fn page_points(page: PageSize, width: u32, height: u32) -> (f32, f32) {
    let short = page.width_mm.min(page.height_mm) * POINTS_PER_MM;
    let long = page.width_mm.max(page.height_mm) * POINTS_PER_MM;
    if width > height {
        (long, short)
    } else {
        (short, long)
    }
}

/// Placement `(x, y, w, h)` of an image fitted and centered on a page.
pub fn fit_centered(page_w: f32, page_h: f32, width: u32, height: u32) -> (f32, f32, f32, f32) {
    let ratio = (page_w / width as f32).min(page_h / height as f32);
    let w = width as f32 * ratio;
    let h = height as f32 * ratio;
    ((page_w - w) / 2.0, (page_h - h) / 2.0, w, h)
}

fn image_xobject(cert: &RenderedCertificate, encoding: PdfImageEncoding) -> Result<Stream> {
    let decoded = image::load_from_memory(&cert.image.bytes)
        .map_err(|e| CertError::Package(format!("cannot decode certificate for {:?}: {}", cert.attendee, e)))?;
    let rgb = flatten_rgb(&decoded.to_rgba8());
    let (width, height) = rgb.dimensions();

    let (filter, data) = match encoding {
        PdfImageEncoding::Jpeg { quality } => {
            let mut data = Vec::new();
            JpegEncoder::new_with_quality(&mut data, quality.clamp(1, 100))
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e| CertError::EncodingFailed(e.to_string()))?;
            ("DCTDecode", data)
        }
        PdfImageEncoding::Flate => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(rgb.as_raw())?;
            ("FlateDecode", encoder.finish()?)
        }
    };

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => filter,
    };
    Ok(Stream::new(dict, data).with_compression(false))
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    cert: &RenderedCertificate,
    config: &PackageConfig,
) -> Result<ObjectId> {
    let (page_w, page_h) = page_points(config.page_size, cert.image.width, cert.image.height);
    let (x, y, w, h) = fit_centered(page_w, page_h, cert.image.width, cert.image.height);

    let image_id = doc.add_object(image_xobject(cert, config.pdf_image)?);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().map_err(pdf_error)?,
    ));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
    }))
}

pub fn write_document(certificates: &[RenderedCertificate], config: &PackageConfig) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::with_capacity(certificates.len());
    for cert in certificates {
        kids.push(add_page(&mut doc, pages_id, cert, config)?.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| CertError::Package(format!("pdf: {}", e)))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::tests::certificate;

    #[test]
    fn test_orientation_follows_image() {
        let (w, h) = page_points(PageSize::A4, 2000, 1000);
        assert!(w > h);
        let (w, h) = page_points(PageSize::A4, 1000, 2000);
        assert!(h > w);
        let (w, h) = page_points(PageSize::A4, 500, 500);
        assert!(h > w);
    }

    #[test]
    fn test_fit_preserves_aspect_and_centers() {
        let (x, y, w, h) = fit_centered(800.0, 600.0, 400, 100);
        assert_eq!((w, h), (800.0, 200.0));
        assert_eq!((x, y), (0.0, 200.0));

        let (x, y, w, h) = fit_centered(600.0, 800.0, 100, 100);
        assert_eq!((w, h), (600.0, 600.0));
        assert_eq!((x, y), (0.0, 100.0));
    }

    #[test]
    fn test_one_page_per_certificate() {
        let certs = vec![
            certificate("A", 40, 20),
            certificate("B", 20, 40),
            certificate("C", 40, 20),
        ];
        let bytes = write_document(&certs, &PackageConfig::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 3);

        let media_box = |n: u32| -> (f32, f32) {
            let page = doc.get_dictionary(pages[&n]).unwrap();
            let mb = page.get(b"MediaBox").unwrap().as_array().unwrap();
            (mb[2].as_float().unwrap(), mb[3].as_float().unwrap())
        };
        let (w1, h1) = media_box(1);
        let (w2, h2) = media_box(2);
        assert!(w1 > h1, "landscape certificate gets a landscape page");
        assert!(h2 > w2, "portrait certificate gets a portrait page");
    }

    #[test]
    fn test_flate_images() {
        let certs = vec![certificate("A", 8, 4)];
        let config = PackageConfig {
            pdf_image: PdfImageEncoding::Flate,
            ..Default::default()
        };
        let bytes = write_document(&certs, &config).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_document_is_deterministic() {
        let certs = vec![certificate("A", 8, 4), certificate("B", 4, 8)];
        let config = PackageConfig::default();
        assert_eq!(
            write_document(&certs, &config).unwrap(),
            write_document(&certs, &config).unwrap()
        );
    }
}
