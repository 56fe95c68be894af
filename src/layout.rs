//! # Text Layout
//!
//! Turns an element's text into positioned lines in output space.
//!
//! ## Wrapping
//!
//! Greedy: words accumulate into a line until the next word would exceed the
//! available width; the line is committed and the word starts the next one.
//! A single word wider than the available width still gets its own line, so
//! text overflows rather than being dropped. Explicit `\n` always breaks.
//!
//! ## Placement
//!
//! ```text
//! anchor (x, y) in preview space, top-left of the preview's text box
//!   │
//!   ├─ origin_x   = x * scale_x + padding * scale_x
//!   └─ baseline_0 = y * scale_y + font_px + padding * scale_y
//!
//! line i:  baseline_i = baseline_0 + i * font_px * line_height
//!          left:   starts at origin_x
//!          center: centered on origin_x
//!          right:  ends at origin_x
//! ```

use crate::config::RenderConfig;
use crate::design::{TextAlign, TextElement};
use crate::error::{CertError, Result};
use crate::font::{FontRegistry, ResolvedFont};
use crate::geometry::{Scale, TemplateSize};

/// Largest usable font size, as a multiple of the template's longer side.
/// Past this a single glyph dwarfs the whole certificate.
pub const MAX_FONT_TO_TEMPLATE: f32 = 4.0;

/// Anything that can measure the advance width of a string.
pub trait Measure {
    fn advance_width(&self, text: &str) -> f32;
}

impl<F: Fn(&str) -> f32> Measure for F {
    fn advance_width(&self, text: &str) -> f32 {
        self(text)
    }
}

/// One laid-out line, relative to the element's origin.
#[derive(Debug, Clone, PartialEq)]
pub struct LineBox {
    pub text: String,
    /// Start of the line relative to the origin (negative for center/right).
    pub x_offset: f32,
    /// Baseline offset from the first line's baseline.
    pub y_offset: f32,
    pub width: f32,
}

/// Greedy word-wrap of `text` at `max_width`.
///
/// Words are separated by single spaces only, so runs of spaces and tabs
/// inside a line survive as written. Spaces at a break are dropped.
pub fn wrap_text(text: &str, max_width: f32, measure: &dyn Measure) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut words = paragraph.split(' ');
        let mut current = words.next().unwrap_or_default().to_string();
        for word in words {
            let candidate = format!("{} {}", current, word);
            let overflows = !word.is_empty()
                && !current.trim().is_empty()
                && measure.advance_width(candidate.trim_end()) > max_width;
            if overflows {
                lines.push(current.trim_end().to_string());
                current = word.to_string();
            } else {
                current = candidate;
            }
        }
        lines.push(current.trim_end().to_string());
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Split on explicit newlines only.
fn split_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.split('\n').map(|l| l.trim_end().to_string()).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Position already-broken lines for an alignment and line advance.
pub fn position_lines(
    lines: Vec<String>,
    align: TextAlign,
    line_advance: f32,
    measure: &dyn Measure,
) -> Vec<LineBox> {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let width = measure.advance_width(&text);
            let x_offset = match align {
                TextAlign::Left => 0.0,
                TextAlign::Center => -width / 2.0,
                TextAlign::Right => -width,
            };
            LineBox {
                text,
                x_offset,
                y_offset: i as f32 * line_advance,
                width,
            }
        })
        .collect()
}

/// Width available to an element whose reference point sits at `origin_x`.
pub fn available_width(align: TextAlign, origin_x: f32, surface_width: f32) -> f32 {
    let to_right = surface_width - origin_x;
    let width = match align {
        TextAlign::Left => to_right,
        TextAlign::Right => origin_x,
        TextAlign::Center => 2.0 * origin_x.min(to_right),
    };
    width.max(0.0)
}

/// Fully resolved layout of one element for one attendee.
#[derive(Debug, Clone)]
pub struct ElementLayout {
    pub font: ResolvedFont,
    /// Font size in output pixels.
    pub font_px: f32,
    pub origin_x: f32,
    /// Baseline of the first line in output space.
    pub baseline_y: f32,
    pub lines: Vec<LineBox>,
}

struct FaceMeasure<'a> {
    font: &'a ResolvedFont,
    px: f32,
}

impl Measure for FaceMeasure<'_> {
    fn advance_width(&self, text: &str) -> f32 {
        self.font.face.advance_width(text, self.px)
    }
}

/// Lay out `element` as it appears on `attendee`'s certificate.
pub fn layout_element(
    element: &TextElement,
    attendee: &str,
    scale: Scale,
    template: TemplateSize,
    registry: &FontRegistry,
    config: &RenderConfig,
) -> Result<ElementLayout> {
    let font_px = scale.font_size(element.font_size);
    if !font_px.is_finite() || font_px <= 0.0 {
        return Err(CertError::layout(
            &element.id,
            format!("font size {} cannot be measured", element.font_size),
        ));
    }
    let longest_side = template.width.max(template.height) as f32;
    if font_px > longest_side * MAX_FONT_TO_TEMPLATE {
        return Err(CertError::layout(
            &element.id,
            format!(
                "font size {} is too large for a {}x{} template",
                element.font_size, template.width, template.height
            ),
        ));
    }
    if !element.line_height.is_finite() || element.line_height < 0.0 {
        return Err(CertError::layout(
            &element.id,
            format!("invalid line height {}", element.line_height),
        ));
    }

    let font = registry
        .resolve(&element.font_family, element.font_weight, element.font_style)
        .ok_or_else(|| {
            CertError::layout(
                &element.id,
                format!("no face available for {:?}", element.font_family),
            )
        })?;

    let (ax, ay) = element.anchor_for(attendee);
    let (x, y) = scale.point(ax, ay);
    let origin_x = x + config.padding * scale.x;
    let baseline_y = y + font_px + config.padding * scale.y;

    let measure = FaceMeasure { font: &font, px: font_px };
    let text = element.text_for(attendee);
    let broken = if config.wrap {
        let max_width = match element.max_width {
            Some(w) => w * scale.x,
            None => available_width(element.text_align, origin_x, template.width as f32),
        };
        wrap_text(text, max_width, &measure)
    } else {
        split_lines(text)
    };

    let lines = position_lines(
        broken,
        element.text_align,
        font_px * element.line_height,
        &measure,
    );

    Ok(ElementLayout {
        font_px,
        origin_x,
        baseline_y,
        lines,
        font,
    })
}
