//! TrueType/OpenType rendering through ab_glyph.
//!
//! Sizes are CSS pixel sizes (one em), converted to ab_glyph's
//! ascent-to-descent scale with the face's units per em.

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};

use super::ClipRect;

fn px_scale(font: &FontArc, px: f32) -> PxScale {
    let upem = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(px * font.height_unscaled() / upem)
}

pub fn advance_width(font: &FontArc, text: &str, px: f32) -> f32 {
    let scaled = font.as_scaled(px_scale(font, px));
    let mut width = 0.0f32;
    let mut prev: Option<GlyphId> = None;

    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(p) = prev {
            width += scaled.kern(p, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }

    width
}

pub fn ascent(font: &FontArc, px: f32) -> f32 {
    font.as_scaled(px_scale(font, px)).ascent()
}

pub fn descent(font: &FontArc, px: f32) -> f32 {
    -font.as_scaled(px_scale(font, px)).descent()
}

/// Rasterize `text` with anti-aliased coverage, baseline at `baseline_y`.
/// Glyphs entirely outside `clip` are not drawn.
pub fn rasterize(
    font: &FontArc,
    text: &str,
    px: f32,
    origin_x: f32,
    baseline_y: f32,
    clip: ClipRect,
    sink: &mut dyn FnMut(i32, i32, f32),
) {
    let scale = px_scale(font, px);
    let scaled = font.as_scaled(scale);
    let mut caret = origin_x;
    let mut prev: Option<GlyphId> = None;

    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(p) = prev {
            caret += scaled.kern(p, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline_y));
        caret += scaled.h_advance(id);
        prev = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let min_x = bounds.min.x as i32;
            let min_y = bounds.min.y as i32;
            let glyph_box = ClipRect::new(
                min_x,
                min_y,
                (bounds.max.x.ceil() as i32).saturating_add(1),
                (bounds.max.y.ceil() as i32).saturating_add(1),
            );
            if glyph_box.intersect(&clip).is_empty() {
                continue;
            }
            outlined.draw(|gx, gy, coverage| {
                let (x, y) = (min_x + gx as i32, min_y + gy as i32);
                if coverage > 0.0 && clip.contains(x, y) {
                    sink(x, y, coverage.min(1.0));
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TUFFY: &[u8] = include_bytes!("../../tests/fixtures/Tuffy.ttf");

    fn tuffy() -> FontArc {
        FontArc::try_from_slice(TUFFY).unwrap()
    }

    fn hits(font: &FontArc, text: &str, clip: ClipRect) -> Vec<(i32, i32, f32)> {
        let mut out = Vec::new();
        rasterize(font, text, 48.0, 10.0, 60.0, clip, &mut |x, y, c| out.push((x, y, c)));
        out
    }

    #[test]
    fn test_metrics_scale_with_size() {
        let font = tuffy();
        let small = advance_width(&font, "Jane Smith", 24.0);
        let large = advance_width(&font, "Jane Smith", 48.0);
        assert!(small > 0.0);
        assert!((large - 2.0 * small).abs() < 0.01);

        assert!(ascent(&font, 48.0) > descent(&font, 48.0));
        assert!(descent(&font, 48.0) > 0.0);
        assert_eq!(advance_width(&font, "", 48.0), 0.0);
    }

    #[test]
    fn test_rasterize_reports_antialiased_coverage() {
        let font = tuffy();
        let all = hits(&font, "Ag", ClipRect::new(0, 0, 200, 200));

        assert!(!all.is_empty());
        assert!(all.iter().all(|&(_, _, c)| c > 0.0 && c <= 1.0));
        assert!(all.iter().any(|&(_, _, c)| c < 1.0));
        // Cap height sits above the baseline, the descender of "g" below it.
        assert!(all.iter().any(|&(_, y, _)| y < 40));
        assert!(all.iter().any(|&(_, y, _)| y > 60));
    }

    #[test]
    fn test_rasterize_respects_clip() {
        let font = tuffy();
        let clip = ClipRect::new(10, 30, 30, 50);
        let clipped = hits(&font, "Ag", clip);
        assert!(!clipped.is_empty());
        assert!(clipped.iter().all(|&(x, y, _)| clip.contains(x, y)));

        assert!(hits(&font, "Ag", ClipRect::new(500, 500, 600, 600)).is_empty());
    }
}
