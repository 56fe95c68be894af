//! Spleen bitmap face used when no outline font resolves.
//!
//! The 12×24 cell is treated as one em and scaled with nearest-neighbor
//! sampling, so it always measures and paints the same way on every host.

use spleen_font::{FONT_12X24, PSF2Font};

use super::ClipRect;

/// Cell size of the Spleen face in font units.
pub const CELL_WIDTH: usize = 12;
pub const CELL_HEIGHT: usize = 24;
/// Rows above the baseline within a cell.
const ASCENT_ROWS: f32 = 19.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitmapFace;

impl BitmapFace {
    fn scale(px: f32) -> f32 {
        px / CELL_HEIGHT as f32
    }

    pub fn advance_width(&self, text: &str, px: f32) -> f32 {
        text.chars().count() as f32 * CELL_WIDTH as f32 * Self::scale(px)
    }

    pub fn ascent(&self, px: f32) -> f32 {
        ASCENT_ROWS * Self::scale(px)
    }

    pub fn descent(&self, px: f32) -> f32 {
        (CELL_HEIGHT as f32 - ASCENT_ROWS) * Self::scale(px)
    }

    /// Paint `text` with its baseline at `baseline_y`, reporting covered
    /// pixels inside `clip`. Cells and rows outside `clip` are never sampled.
    pub fn rasterize(
        &self,
        text: &str,
        px: f32,
        origin_x: f32,
        baseline_y: f32,
        clip: ClipRect,
        sink: &mut dyn FnMut(i32, i32, f32),
    ) -> Result<(), String> {
        if clip.is_empty() {
            return Ok(());
        }
        let mut font =
            PSF2Font::new(FONT_12X24).map_err(|_| "bitmap font data is corrupt".to_string())?;

        let scale = Self::scale(px);
        let cell_w = CELL_WIDTH as f32 * scale;
        let dst_w = cell_w.ceil() as i32;
        let dst_h = (CELL_HEIGHT as f32 * scale).ceil() as i32;
        let top = (baseline_y - self.ascent(px)).round() as i32;

        let rows = clip.top.saturating_sub(top).max(0)..clip.bottom.saturating_sub(top).min(dst_h);
        if rows.is_empty() {
            return Ok(());
        }

        for (i, ch) in text.chars().enumerate() {
            let left = (origin_x + i as f32 * cell_w).round() as i32;
            if left >= clip.right {
                break;
            }
            if ch.is_whitespace() || left.saturating_add(dst_w) <= clip.left {
                continue;
            }
            let cell = glyph_cell(&mut font, ch);
            let cols = clip.left.saturating_sub(left).max(0)..clip.right.saturating_sub(left).min(dst_w);

            for dy in rows.clone() {
                let sy = ((dy as f32 / scale) as usize).min(CELL_HEIGHT - 1);
                for dx in cols.clone() {
                    let sx = ((dx as f32 / scale) as usize).min(CELL_WIDTH - 1);
                    if cell[sy * CELL_WIDTH + sx] {
                        sink(left + dx, top + dy, 1.0);
                    }
                }
            }
        }

        Ok(())
    }
}

/// Unscaled cell bitmap for `ch`; unknown characters get a box outline.
fn glyph_cell(font: &mut PSF2Font, ch: char) -> Vec<bool> {
    let mut cell = vec![false; CELL_WIDTH * CELL_HEIGHT];
    let utf8 = ch.to_string();

    match font.glyph_for_utf8(utf8.as_bytes()) {
        Some(glyph) => {
            for (row_y, row) in glyph.enumerate() {
                for (col_x, on) in row.enumerate() {
                    if row_y < CELL_HEIGHT && col_x < CELL_WIDTH {
                        cell[row_y * CELL_WIDTH + col_x] = on;
                    }
                }
            }
        }
        None => {
            for x in 0..CELL_WIDTH {
                cell[x] = true;
                cell[(CELL_HEIGHT - 1) * CELL_WIDTH + x] = true;
            }
            for y in 0..CELL_HEIGHT {
                cell[y * CELL_WIDTH] = true;
                cell[y * CELL_WIDTH + CELL_WIDTH - 1] = true;
            }
        }
    }

    cell
}

#[cfg(test)]
mod tests {
    use super::*;

    fn everywhere() -> ClipRect {
        ClipRect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX)
    }

    #[test]
    fn test_advance_scales_with_size() {
        let face = BitmapFace;
        assert_eq!(face.advance_width("abcd", 24.0), 48.0);
        assert_eq!(face.advance_width("abcd", 48.0), 96.0);
        assert_eq!(face.advance_width("", 48.0), 0.0);
    }

    #[test]
    fn test_rasterize_covers_pixels_above_baseline() {
        let face = BitmapFace;
        let mut hits = Vec::new();
        face.rasterize("H", 24.0, 10.0, 40.0, everywhere(), &mut |x, y, _| hits.push((x, y)))
            .unwrap();

        assert!(!hits.is_empty());
        assert!(hits.iter().all(|&(x, _)| (10..22).contains(&x)));
        assert!(hits.iter().all(|&(_, y)| (21..45).contains(&y)));
    }

    #[test]
    fn test_whitespace_paints_nothing() {
        let mut count = 0;
        BitmapFace
            .rasterize("   ", 24.0, 0.0, 24.0, everywhere(), &mut |_, _, _| count += 1)
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_clip_limits_reported_pixels() {
        let clip = ClipRect::new(0, 0, 40, 30);
        let mut hits = Vec::new();
        BitmapFace
            .rasterize("HHHH", 240.0, -60.0, 150.0, clip, &mut |x, y, _| hits.push((x, y)))
            .unwrap();

        assert!(!hits.is_empty());
        assert!(hits.iter().all(|&(x, y)| clip.contains(x, y)));
    }

    #[test]
    fn test_huge_size_stays_inside_clip() {
        // A 100_000 px cell would be ten billion samples unclipped.
        let clip = ClipRect::new(0, 0, 64, 64);
        let mut count = 0usize;
        BitmapFace
            .rasterize("Jane Smith", 100_000.0, 0.0, 50_000.0, clip, &mut |_, _, _| count += 1)
            .unwrap();
        assert!(count <= 64 * 64);
    }

    #[test]
    fn test_empty_clip_paints_nothing() {
        let mut count = 0;
        BitmapFace
            .rasterize("H", 24.0, 0.0, 24.0, ClipRect::new(5, 5, 5, 5), &mut |_, _, _| count += 1)
            .unwrap();
        assert_eq!(count, 0);
    }
}
