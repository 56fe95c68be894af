//! Painting laid-out text onto the output surface.
//!
//! Each line is rasterized into an f32 coverage mask (0.0 = untouched,
//! 1.0 = fully inked), then composited over the surface in the element's
//! color with source-over blending. Styling the face cannot provide is
//! synthesized here:
//!
//! | Style | Synthesis |
//! |-------|-----------|
//! | bold | extra strikes shifted right by `max(1, px / 24)` pixels |
//! | italic | rows sheared right by `0.2 * (baseline - y)` |
//! | underline | bar below the baseline |
//! | line-through | bar through the x-height |

use image::RgbaImage;

use crate::design::{Color, TextDecoration, TextElement};
use crate::font::ClipRect;
use crate::layout::{ElementLayout, LineBox};

const ITALIC_SHEAR: f32 = 0.2;

/// Coverage accumulated for one line, clipped to a window of the surface.
/// The window is never larger than the surface it composites onto.
struct CoverageMask {
    left: i32,
    top: i32,
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl CoverageMask {
    fn new(window: ClipRect) -> Self {
        let width = window.right.saturating_sub(window.left).max(0) as usize;
        let height = window.bottom.saturating_sub(window.top).max(0) as usize;
        Self {
            left: window.left,
            top: window.top,
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    fn add(&mut self, x: i32, y: i32, coverage: f32) {
        let mx = x - self.left;
        let my = y - self.top;
        if mx < 0 || my < 0 || mx >= self.width as i32 || my >= self.height as i32 {
            return;
        }
        let idx = my as usize * self.width + mx as usize;
        self.data[idx] = (self.data[idx] + coverage).min(1.0);
    }

    fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        let right = self.left.saturating_add(self.width as i32);
        let bottom = self.top.saturating_add(self.height as i32);
        for y in y0.max(self.top)..y1.min(bottom) {
            for x in x0.max(self.left)..x1.min(right) {
                self.add(x, y, 1.0);
            }
        }
    }

    fn composite(&self, surface: &mut RgbaImage, color: Color) {
        let (sw, sh) = (surface.width() as i32, surface.height() as i32);
        for my in 0..self.height {
            let y = self.top + my as i32;
            if y < 0 || y >= sh {
                continue;
            }
            for mx in 0..self.width {
                let coverage = self.data[my * self.width + mx];
                if coverage <= 0.0 {
                    continue;
                }
                let x = self.left + mx as i32;
                if x < 0 || x >= sw {
                    continue;
                }
                let px = surface.get_pixel_mut(x as u32, y as u32);
                px.0 = blend_over(px.0, color, coverage);
            }
        }
    }
}

/// Source-over blend of `color` at `coverage` onto `dst`.
fn blend_over(dst: [u8; 4], color: Color, coverage: f32) -> [u8; 4] {
    let sa = coverage * color.a as f32 / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }

    let channel = |s: u8, d: u8| {
        let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };

    [
        channel(color.r, dst[0]),
        channel(color.g, dst[1]),
        channel(color.b, dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}

fn bold_offset(px: f32) -> i32 {
    ((px / 24.0).round() as i32).max(1)
}

fn decoration_thickness(px: f32) -> i32 {
    ((px / 15.0).round() as i32).max(1)
}

fn paint_line(
    surface: &mut RgbaImage,
    layout: &ElementLayout,
    element: &TextElement,
    line: &LineBox,
) -> Result<(), String> {
    let px = layout.font_px;
    let face = &layout.font.face;
    let x = layout.origin_x + line.x_offset;
    let baseline = layout.baseline_y + line.y_offset;

    let ascent = face.ascent(px).max(px);
    let descent = face.descent(px).max(px * 0.3);
    let line_box = ClipRect::new(
        (x - px).floor() as i32,
        (baseline - ascent - px).floor() as i32,
        (x + line.width + 2.0 * px).ceil() as i32,
        (baseline + descent + px).ceil() as i32,
    );
    let window = line_box.intersect(&ClipRect::surface(surface.width(), surface.height()));
    if window.is_empty() {
        return Ok(());
    }
    let mut mask = CoverageMask::new(window);

    let strikes = if layout.font.synthetic_bold {
        bold_offset(px)
    } else {
        0
    };
    let italic = layout.font.synthetic_italic;
    // Glyph pixels that bold or italic shift into the window.
    let reach = if italic {
        (ITALIC_SHEAR * (ascent + descent)).ceil() as i32
    } else {
        0
    };
    let glyph_clip = window.widen(reach.saturating_add(strikes));

    face.rasterize(&line.text, px, x, baseline, glyph_clip, &mut |gx, gy, coverage| {
        let shift = if italic {
            (ITALIC_SHEAR * (baseline - gy as f32)).round() as i32
        } else {
            0
        };
        for dx in 0..=strikes {
            mask.add(gx.saturating_add(shift + dx), gy, coverage);
        }
    })?;

    if line.width > 0.0 {
        let thickness = decoration_thickness(px);
        let bar_top = match element.text_decoration {
            TextDecoration::None => None,
            TextDecoration::Underline => Some((baseline + px * 0.1).round() as i32),
            TextDecoration::LineThrough => Some((baseline - px * 0.3).round() as i32),
        };
        if let Some(top) = bar_top {
            mask.fill_rect(
                x.floor() as i32,
                top,
                ((x + line.width).ceil() as i32).saturating_add(strikes),
                top.saturating_add(thickness),
            );
        }
    }

    mask.composite(surface, element.color);
    Ok(())
}

/// Paint every line of a laid-out element.
pub(crate) fn paint_element(
    surface: &mut RgbaImage,
    layout: &ElementLayout,
    element: &TextElement,
) -> Result<(), String> {
    if element.color.is_transparent() {
        return Ok(());
    }
    for line in &layout.lines {
        paint_line(surface, layout, element, line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_opaque_color_replaces() {
        let out = blend_over([255, 255, 255, 255], Color::BLACK, 1.0);
        assert_eq!(out, [0, 0, 0, 255]);
    }

    #[test]
    fn test_blend_half_coverage() {
        let out = blend_over([255, 255, 255, 255], Color::BLACK, 0.5);
        assert_eq!(out, [128, 128, 128, 255]);
    }

    #[test]
    fn test_blend_onto_transparent_takes_color() {
        let red = Color::rgb(255, 0, 0);
        let out = blend_over([0, 0, 0, 0], red, 1.0);
        assert_eq!(out, [255, 0, 0, 255]);
    }

    #[test]
    fn test_blend_zero_coverage_is_noop() {
        let dst = [12, 34, 56, 200];
        assert_eq!(blend_over(dst, Color::BLACK, 0.0), dst);
    }

    #[test]
    fn test_mask_clips_outside_window() {
        let mut mask = CoverageMask::new(ClipRect::new(0, 0, 4, 4));
        mask.add(-1, 0, 1.0);
        mask.add(4, 4, 1.0);
        mask.add(1, 1, 0.7);
        mask.add(1, 1, 0.7);
        assert!(mask.data.iter().filter(|&&c| c > 0.0).count() == 1);
        assert_eq!(mask.data[5], 1.0);
    }

    #[test]
    fn test_synthesis_sizes() {
        assert_eq!(bold_offset(12.0), 1);
        assert_eq!(bold_offset(96.0), 4);
        assert_eq!(decoration_thickness(10.0), 1);
        assert_eq!(decoration_thickness(60.0), 4);
    }

    #[test]
    fn test_fill_rect_stays_in_window() {
        let mut mask = CoverageMask::new(ClipRect::new(10, 10, 14, 12));
        mask.fill_rect(i32::MIN, 0, i32::MAX, 100);
        assert!(mask.data.iter().all(|&c| c == 1.0));
    }
}
