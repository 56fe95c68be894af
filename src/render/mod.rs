//! # Certificate Rasterizer
//!
//! Composites one certificate for one attendee at the template's native
//! resolution, never at preview resolution.
//!
//! ```text
//! Template ──► clone to surface (exclusive to this render)
//!                 │
//!  elements ──► for each, in list order:
//!                 layout_element ──► paint_element
//!                 (LayoutUnavailable: skip element, keep going)
//!                 │
//!               encode ──► EncodedImage (PNG or JPEG)
//! ```
//!
//! Later elements paint over earlier ones; list order is the only z-order.
//!
//! ## Example
//!
//! ```
//! use certforge::design::TextElement;
//! use certforge::font::FontRegistry;
//! use certforge::geometry::PreviewSize;
//! use certforge::render::{Rasterizer, Template};
//! use certforge::config::RenderConfig;
//!
//! let template = Template::from_image(image::RgbaImage::from_pixel(
//!     400, 200, image::Rgba([255, 255, 255, 255]),
//! ))?;
//! let elements = vec![TextElement::name_placeholder(40.0, 40.0)];
//! let preview = PreviewSize::fit_height(template.size(), 500.0);
//!
//! let registry = FontRegistry::new();
//! let config = RenderConfig::default();
//! let rendered = Rasterizer::new(&registry, &config)
//!     .render(Some(&template), &elements, preview, "Jane Smith")?;
//! assert_eq!((rendered.image.width, rendered.image.height), (400, 200));
//! # Ok::<(), certforge::error::CertError>(())
//! ```

pub mod encode;
mod paint;

pub use encode::EncodedImage;

use image::RgbaImage;
use log::{debug, warn};
use std::path::Path;

use crate::config::RenderConfig;
use crate::design::TextElement;
use crate::error::{CertError, Result};
use crate::font::{FontRegistry, decode_data_uri};
use crate::geometry::{PreviewSize, Scale, TemplateSize};
use crate::layout::layout_element;

/// A decoded certificate background at native resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    image: RgbaImage,
}

impl Template {
    pub fn from_image(image: RgbaImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(CertError::TemplateUnavailable(
                "template image has no pixels".into(),
            ));
        }
        Ok(Self { image })
    }

    /// Decode any format the `image` crate recognizes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| CertError::TemplateUnavailable(format!("cannot decode template: {}", e)))?;
        Self::from_image(image.to_rgba8())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            CertError::TemplateUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::decode(&bytes)
    }

    /// Decode a `data:image/...;base64,` URI as the designer stores it.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let bytes = decode_data_uri(uri)
            .map_err(|e| CertError::TemplateUnavailable(e.to_string()))?;
        Self::decode(&bytes)
    }

    pub fn size(&self) -> TemplateSize {
        TemplateSize::new(self.image.width(), self.image.height())
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// An element left out of a certificate because it could not be laid out
/// or painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedElement {
    pub element_id: String,
    pub reason: String,
}

/// One attendee's finished certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCertificate {
    pub attendee: String,
    pub image: EncodedImage,
    pub skipped: Vec<SkippedElement>,
}

impl RenderedCertificate {
    /// `certificate_<attendee>.<ext>`
    pub fn suggested_filename(&self) -> String {
        format!("certificate_{}.{}", self.attendee, self.image.format.extension())
    }
}

/// Renders certificates against a shared, read-only font registry.
#[derive(Debug, Clone, Copy)]
pub struct Rasterizer<'a> {
    registry: &'a FontRegistry,
    config: &'a RenderConfig,
}

impl<'a> Rasterizer<'a> {
    pub fn new(registry: &'a FontRegistry, config: &'a RenderConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &RenderConfig {
        self.config
    }

    /// Composite `elements` over the template for `attendee`, without encoding.
    pub fn compose(
        &self,
        template: Option<&Template>,
        elements: &[TextElement],
        preview: PreviewSize,
        attendee: &str,
    ) -> Result<(RgbaImage, Vec<SkippedElement>)> {
        let template = template
            .ok_or_else(|| CertError::TemplateUnavailable("no template image loaded".into()))?;
        let size = template.size();
        let scale = Scale::resolve(size, preview).ok_or_else(|| {
            CertError::TemplateUnavailable(format!(
                "preview size {}x{} is not ready",
                preview.width, preview.height
            ))
        })?;

        let mut surface = template.image.clone();
        let mut skipped = Vec::new();

        for element in elements {
            let painted = layout_element(element, attendee, scale, size, self.registry, self.config)
                .and_then(|layout| {
                    paint::paint_element(&mut surface, &layout, element)
                        .map_err(|reason| CertError::layout(&element.id, reason))
                });

            if let Err(e) = painted {
                warn!("skipping element {} for {:?}: {}", element.id, attendee, e);
                let reason = match e {
                    CertError::LayoutUnavailable { reason, .. } => reason,
                    other => other.to_string(),
                };
                skipped.push(SkippedElement {
                    element_id: element.id.clone(),
                    reason,
                });
            }
        }

        Ok((surface, skipped))
    }

    /// Composite and encode one certificate.
    pub fn render(
        &self,
        template: Option<&Template>,
        elements: &[TextElement],
        preview: PreviewSize,
        attendee: &str,
    ) -> Result<RenderedCertificate> {
        let (surface, skipped) = self.compose(template, elements, preview, attendee)?;
        let image = encode::encode(&surface, self.config.format, self.config.quality)?;
        debug!(
            "rendered {:?}: {}x{}, {} bytes",
            attendee,
            image.width,
            image.height,
            image.bytes.len()
        );
        Ok(RenderedCertificate {
            attendee: attendee.to_string(),
            image,
            skipped,
        })
    }
}
