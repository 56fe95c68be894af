//! # Render and Package Configuration
//!
//! Every field has a default, so a project file only names what it changes:
//!
//! ```json
//! { "render": { "padding": 6, "format": "jpeg", "quality": 85 },
//!   "package": { "pdfImage": { "encoding": "flate" } } }
//! ```

use serde::{Deserialize, Serialize};

use crate::geometry::DEFAULT_PREVIEW_HEIGHT;

/// Encoded image format for rendered certificates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }
}

fn default_preview_height() -> f32 {
    DEFAULT_PREVIEW_HEIGHT
}

fn default_padding() -> f32 {
    4.0
}

fn default_quality() -> u8 {
    100
}

fn default_true() -> bool {
    true
}

/// Settings for rasterizing one certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    /// Fixed height of the designer preview, in preview units.
    #[serde(default = "default_preview_height")]
    pub preview_height: f32,
    /// Inset between an element's anchor and its text, in preview pixels.
    /// Matches the padding of the preview's text boxes.
    #[serde(default = "default_padding")]
    pub padding: f32,
    #[serde(default)]
    pub format: OutputFormat,
    /// 0-100. JPEG quality, or PNG compression effort.
    #[serde(default = "default_quality")]
    pub quality: u8,
    /// Greedy word-wrap at the available width.
    #[serde(default = "default_true")]
    pub wrap: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            preview_height: default_preview_height(),
            padding: default_padding(),
            format: OutputFormat::default(),
            quality: default_quality(),
            wrap: true,
        }
    }
}

/// How certificate images are stored inside a PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "encoding", rename_all = "lowercase")]
pub enum PdfImageEncoding {
    /// DCT-compressed at `quality`.
    Jpeg { quality: u8 },
    /// Lossless RGB, deflate-compressed.
    Flate,
}

impl Default for PdfImageEncoding {
    fn default() -> Self {
        PdfImageEncoding::Jpeg { quality: 92 }
    }
}

/// Page size in millimetres, portrait orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };
    pub const LETTER: PageSize = PageSize {
        width_mm: 215.9,
        height_mm: 279.4,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::A4
    }
}

fn default_archive_name() -> String {
    "certificates.zip".to_string()
}

fn default_document_name() -> String {
    "Certificates.pdf".to_string()
}

/// Settings for bundling a batch into one deliverable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageConfig {
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default)]
    pub pdf_image: PdfImageEncoding,
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
    #[serde(default = "default_document_name")]
    pub document_name: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            pdf_image: PdfImageEncoding::default(),
            archive_name: default_archive_name(),
            document_name: default_document_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let render: RenderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(render, RenderConfig::default());
        assert_eq!(render.preview_height, 500.0);
        assert_eq!(render.padding, 4.0);

        let package: PackageConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(package, PackageConfig::default());
        assert_eq!(package.pdf_image, PdfImageEncoding::Jpeg { quality: 92 });
    }

    #[test]
    fn test_partial_overrides() {
        let render: RenderConfig =
            serde_json::from_str(r#"{"padding": 0, "format": "jpeg", "quality": 80}"#).unwrap();
        assert_eq!(render.padding, 0.0);
        assert_eq!(render.format, OutputFormat::Jpeg);
        assert_eq!(render.format.extension(), "jpg");
        assert!(render.wrap);

        let package: PackageConfig =
            serde_json::from_str(r#"{"pdfImage": {"encoding": "flate"}}"#).unwrap();
        assert_eq!(package.pdf_image, PdfImageEncoding::Flate);
    }
}
