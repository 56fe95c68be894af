//! Surface serialization to PNG or JPEG bytes.
//!
//! Output is a pure function of the pixels and settings: no timestamps or
//! other metadata are written, so identical renders encode identically.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};

use crate::config::OutputFormat;
use crate::error::{CertError, Result};

/// An encoded certificate image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

impl EncodedImage {
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// Map 0-100 to PNG compression effort:
/// - 0-25: Fast
/// - 26-75: Default
/// - 76-100: Best
fn png_compression(quality: u8) -> CompressionType {
    if quality <= 25 {
        CompressionType::Fast
    } else if quality <= 75 {
        CompressionType::Default
    } else {
        CompressionType::Best
    }
}

/// Composite an RGBA surface over white, dropping alpha.
pub fn flatten_rgb(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y).0;
        let a = p[3] as u32;
        let over_white = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([over_white(p[0]), over_white(p[1]), over_white(p[2])])
    })
}

pub fn encode(image: &RgbaImage, format: OutputFormat, quality: u8) -> Result<EncodedImage> {
    let (width, height) = image.dimensions();
    let mut bytes = Vec::new();

    match format {
        OutputFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut bytes, png_compression(quality), FilterType::Adaptive);
            encoder
                .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e: image::ImageError| CertError::EncodingFailed(e.to_string()))?;
        }
        OutputFormat::Jpeg => {
            let rgb = flatten_rgb(image);
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
            encoder
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e: image::ImageError| CertError::EncodingFailed(e.to_string()))?;
        }
    }

    Ok(EncodedImage {
        bytes,
        width,
        height,
        format,
    })
}
