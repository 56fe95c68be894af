//! # Preview ↔ Output Scaling
//!
//! The designer positions elements over a scaled-down preview whose height is
//! fixed and whose width follows the template's aspect ratio. Rendering happens
//! at the template's native resolution, so every preview-space quantity is
//! multiplied by a per-axis scale before it reaches the output surface.
//!
//! ```text
//! pw = ph * W / H
//! scale_x = W / pw
//! scale_y = H / ph
//! ```
//!
//! Font sizes scale by `scale_y` only: the vertical metric drives legibility
//! consistently across aspect ratios.

use serde::{Deserialize, Serialize};

/// Height of the designer preview in preview units.
pub const DEFAULT_PREVIEW_HEIGHT: f32 = 500.0;

/// Native pixel dimensions of a template image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateSize {
    pub width: u32,
    pub height: u32,
}

impl TemplateSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when the image is wider than it is tall.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// Dimensions of the on-screen preview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewSize {
    pub width: f32,
    pub height: f32,
}

impl PreviewSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Preview with a fixed `height` and a width derived from the template's
    /// aspect ratio. A template without height yields a zero-width preview,
    /// which [`Scale::resolve`] reports as not ready.
    pub fn fit_height(template: TemplateSize, height: f32) -> Self {
        let width = if template.height == 0 {
            0.0
        } else {
            height * template.width as f32 / template.height as f32
        };
        Self { width, height }
    }
}

/// Per-axis factors mapping preview space to output space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

impl Scale {
    /// Resolve the scale between `preview` and the template's native size.
    ///
    /// Returns `None` ("not ready") when either height is zero or the preview
    /// has no width; callers must not render in that state.
    pub fn resolve(template: TemplateSize, preview: PreviewSize) -> Option<Scale> {
        let ready = template.height > 0
            && template.width > 0
            && preview.height.is_finite()
            && preview.width.is_finite()
            && preview.height > 0.0
            && preview.width > 0.0;
        if !ready {
            return None;
        }

        Some(Scale {
            x: template.width as f32 / preview.width,
            y: template.height as f32 / preview.height,
        })
    }

    /// Map a preview-space point to output space.
    pub fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.x, y * self.y)
    }

    /// Map a preview-space font size to output space.
    pub fn font_size(&self, size: f32) -> f32 {
        size * self.y
    }
}
