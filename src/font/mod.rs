//! # Font Registry
//!
//! An explicit, injectable mapping from family name to font faces. Renders
//! receive the registry by reference, so a render is a pure function of its
//! inputs and tests can supply a fixed registry.
//!
//! ## Sources
//!
//! | Source | Families | Faces come from |
//! |--------|----------|-----------------|
//! | Built-in | Arial, Times New Roman, Courier New | installed fonts (fontdb) |
//! | Web service | Inter, Roboto, Lato, ... | installed fonts (fontdb) |
//! | Custom | uploaded font files | the uploaded bytes |
//!
//! ## Resolution
//!
//! ```text
//! "Lato, Arial" ──► first family with a loaded face
//!                   └─► face with matching style, nearest weight
//!                       └─► synthesize bold / italic if missing
//! no family     ──► bitmap fallback (unless built without one)
//! ```
//!
//! Entries are only ever added; a registry shared across threads is read-only.

mod bitmap;
mod outline;
mod system;

pub use bitmap::BitmapFace;

use ab_glyph::FontArc;
use base64::Engine;
use log::debug;
use serde::Serialize;
use std::path::Path;

use crate::design::{FontStyle, FontWeight};
use crate::error::{CertError, Result};

/// Families every registry knows, in the designer's listing order.
pub const BUILTIN_FAMILIES: &[&str] = &["Arial", "Times New Roman", "Courier New"];

/// Families the designer offers from its web font service.
pub const WEB_FAMILIES: &[&str] = &[
    "Inter",
    "Roboto",
    "Open Sans",
    "Montserrat",
    "Lato",
    "Poppins",
    "Merriweather",
    "Playfair Display",
    "Raleway",
    "Nunito",
    "Source Sans 3",
];

/// Where a family's faces come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FontSource {
    Builtin,
    WebService,
    Custom { url: String },
}

/// Pixel window a rasterizer reports into. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ClipRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The whole of a `width` x `height` surface.
    pub fn surface(width: u32, height: u32) -> Self {
        Self::new(
            0,
            0,
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub fn intersect(&self, other: &ClipRect) -> ClipRect {
        ClipRect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        )
    }

    /// Grow left and right by `dx` pixels.
    pub fn widen(&self, dx: i32) -> ClipRect {
        ClipRect::new(
            self.left.saturating_sub(dx),
            self.top,
            self.right.saturating_add(dx),
            self.bottom,
        )
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// A renderable face.
#[derive(Clone)]
pub enum Face {
    Outline(FontArc),
    Bitmap(BitmapFace),
}

impl std::fmt::Debug for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Face::Outline(_) => f.write_str("Face::Outline"),
            Face::Bitmap(_) => f.write_str("Face::Bitmap"),
        }
    }
}

impl Face {
    /// Horizontal advance of `text` at `px` pixels per em.
    pub fn advance_width(&self, text: &str, px: f32) -> f32 {
        match self {
            Face::Outline(font) => outline::advance_width(font, text, px),
            Face::Bitmap(face) => face.advance_width(text, px),
        }
    }

    /// Distance from baseline to the top of the tallest glyphs.
    pub fn ascent(&self, px: f32) -> f32 {
        match self {
            Face::Outline(font) => outline::ascent(font, px),
            Face::Bitmap(face) => face.ascent(px),
        }
    }

    /// Distance from baseline to the bottom of descenders (positive).
    pub fn descent(&self, px: f32) -> f32 {
        match self {
            Face::Outline(font) => outline::descent(font, px),
            Face::Bitmap(face) => face.descent(px),
        }
    }

    /// Report coverage for every pixel `text` touches inside `clip`.
    pub fn rasterize(
        &self,
        text: &str,
        px: f32,
        origin_x: f32,
        baseline_y: f32,
        clip: ClipRect,
        sink: &mut dyn FnMut(i32, i32, f32),
    ) -> std::result::Result<(), String> {
        match self {
            Face::Outline(font) => {
                outline::rasterize(font, text, px, origin_x, baseline_y, clip, sink);
                Ok(())
            }
            Face::Bitmap(face) => face.rasterize(text, px, origin_x, baseline_y, clip, sink),
        }
    }
}

/// One face of a family.
#[derive(Debug, Clone)]
pub struct RegisteredFace {
    pub weight: u16,
    pub italic: bool,
    pub face: Face,
}

#[derive(Debug, Clone)]
struct FamilyEntry {
    name: String,
    source: FontSource,
    faces: Vec<RegisteredFace>,
}

/// Face chosen for one element, with any styling the face lacks.
#[derive(Debug, Clone)]
pub struct ResolvedFont {
    pub family: String,
    pub face: Face,
    pub synthetic_bold: bool,
    pub synthetic_italic: bool,
}

#[derive(Debug, Clone)]
pub struct FontRegistry {
    families: Vec<FamilyEntry>,
    fallback: Option<Face>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    /// Registry with the built-in and web family names and a bitmap fallback.
    ///
    /// No outline faces are loaded until [`load_system_fonts`](Self::load_system_fonts)
    /// or one of the `register_*` methods is called.
    pub fn new() -> Self {
        let mut families = Vec::new();
        for name in BUILTIN_FAMILIES {
            families.push(FamilyEntry {
                name: name.to_string(),
                source: FontSource::Builtin,
                faces: Vec::new(),
            });
        }
        for name in WEB_FAMILIES {
            families.push(FamilyEntry {
                name: name.to_string(),
                source: FontSource::WebService,
                faces: Vec::new(),
            });
        }

        Self {
            families,
            fallback: Some(Face::Bitmap(BitmapFace)),
        }
    }

    /// Registry whose unresolved families fail layout instead of falling back.
    pub fn without_fallback() -> Self {
        Self {
            fallback: None,
            ..Self::new()
        }
    }

    fn entry_index(&self, name: &str) -> Option<usize> {
        self.families
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    fn entry_mut(&mut self, name: &str, source: FontSource) -> &mut FamilyEntry {
        let index = match self.entry_index(name) {
            Some(i) => i,
            None => {
                self.families.push(FamilyEntry {
                    name: name.to_string(),
                    source: source.clone(),
                    faces: Vec::new(),
                });
                self.families.len() - 1
            }
        };
        let entry = &mut self.families[index];
        if matches!(source, FontSource::Custom { .. }) {
            entry.source = source;
        }
        entry
    }

    /// Load installed faces for every built-in and web family (best effort).
    ///
    /// Returns the number of faces loaded.
    pub fn load_system_fonts(&mut self) -> usize {
        let db = system::system_database();
        let mut loaded = 0;

        for entry in &mut self.families {
            if !entry.faces.is_empty() || matches!(entry.source, FontSource::Custom { .. }) {
                continue;
            }
            let mut faces = system::query_family(&db, &entry.name);
            if faces.is_empty() {
                for alt in system::substitutes(&entry.name) {
                    faces = system::query_family(&db, alt);
                    if !faces.is_empty() {
                        debug!("family {} provided by {}", entry.name, alt);
                        break;
                    }
                }
            }
            loaded += faces.len();
            entry.faces = faces;
        }

        debug!("loaded {} system font faces", loaded);
        loaded
    }

    /// Register font file bytes under `name`.
    pub fn register_font_bytes(&mut self, name: &str, bytes: Vec<u8>, source: FontSource) -> Result<usize> {
        let faces = system::faces_from_bytes(bytes);
        if faces.is_empty() {
            return Err(CertError::Font(format!("no usable faces for font {:?}", name)));
        }
        let count = faces.len();
        self.entry_mut(name, source).faces.extend(faces);
        Ok(count)
    }

    /// Register a font file; the family name is the file name without extension.
    pub fn register_font_file(&mut self, path: &Path) -> Result<String> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| CertError::Font(format!("cannot name font file {}", path.display())))?
            .to_string();
        let bytes = std::fs::read(path)?;
        self.register_font_bytes(
            &name,
            bytes,
            FontSource::Custom {
                url: path.display().to_string(),
            },
        )?;
        Ok(name)
    }

    /// Register a custom font by URL as the designer stores it.
    ///
    /// `data:` URIs, `file://` URLs and plain paths are loaded. Other URLs (for
    /// example browser object URLs) are recorded without faces; text in that
    /// family then falls back. Returns whether faces were loaded.
    pub fn register_custom_url(&mut self, name: &str, url: &str) -> Result<bool> {
        let source = FontSource::Custom { url: url.to_string() };

        let bytes = if url.starts_with("data:") {
            Some(decode_data_uri(url)?)
        } else if let Some(path) = url.strip_prefix("file://") {
            Some(std::fs::read(path)?)
        } else if !url.contains("://") && !url.starts_with("blob:") && Path::new(url).is_file() {
            Some(std::fs::read(url)?)
        } else {
            None
        };

        match bytes {
            Some(bytes) => {
                self.register_font_bytes(name, bytes, source)?;
                Ok(true)
            }
            None => {
                debug!("custom font {} recorded without faces ({})", name, url);
                self.entry_mut(name, source);
                Ok(false)
            }
        }
    }

    /// Family names in the designer's listing order: built-ins, web, custom.
    pub fn font_options(&self) -> Vec<String> {
        let rank = |s: &FontSource| match s {
            FontSource::Builtin => 0,
            FontSource::WebService => 1,
            FontSource::Custom { .. } => 2,
        };
        let mut entries: Vec<&FamilyEntry> = self.families.iter().collect();
        entries.sort_by_key(|e| rank(&e.source));
        entries.into_iter().map(|e| e.name.clone()).collect()
    }

    pub fn source(&self, name: &str) -> Option<&FontSource> {
        self.entry_index(name).map(|i| &self.families[i].source)
    }

    /// Whether `name` has at least one loaded face.
    pub fn has_faces(&self, name: &str) -> bool {
        self.entry_index(name)
            .map(|i| !self.families[i].faces.is_empty())
            .unwrap_or(false)
    }

    /// Pick a face for a CSS family list, weight and style.
    pub fn resolve(&self, family: &str, weight: FontWeight, style: FontStyle) -> Option<ResolvedFont> {
        let want_weight = weight.value();
        let want_italic = style == FontStyle::Italic;

        for candidate in family.split(',') {
            let name = candidate.trim().trim_matches(|c| c == '"' || c == '\'');
            let Some(index) = self.entry_index(name) else {
                continue;
            };
            let entry = &self.families[index];

            let best = entry.faces.iter().min_by_key(|f| {
                let style_penalty = if f.italic == want_italic { 0 } else { 1000 };
                style_penalty + (f.weight as i32 - want_weight as i32).unsigned_abs()
            });

            if let Some(face) = best {
                return Some(ResolvedFont {
                    family: entry.name.clone(),
                    face: face.face.clone(),
                    synthetic_bold: want_weight >= 600 && face.weight < 600,
                    synthetic_italic: want_italic && !face.italic,
                });
            }
        }

        let fallback = self.fallback.clone()?;
        debug!("family {:?} has no faces; using bitmap fallback", family);
        Some(ResolvedFont {
            family: "fallback".to_string(),
            face: fallback,
            synthetic_bold: weight.is_bold(),
            synthetic_italic: want_italic,
        })
    }
}

/// Decode the payload of a base64 `data:` URI.
pub(crate) fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| CertError::InvalidInput("data URI has no payload".into()))?;
    if !header.ends_with(";base64") {
        return Err(CertError::InvalidInput("only base64 data URIs are supported".into()));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| CertError::InvalidInput(format!("invalid base64 in data URI: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clip_rect_intersection() {
        let surface = ClipRect::surface(400, 200);
        let window = ClipRect::new(-50, 150, 120, 900).intersect(&surface);
        assert_eq!(window, ClipRect::new(0, 150, 120, 200));
        assert!(window.contains(0, 199));
        assert!(!window.contains(120, 160));

        let off = ClipRect::new(500, 0, 900, 100).intersect(&surface);
        assert!(off.is_empty());
        assert_eq!(ClipRect::new(i32::MIN, 0, i32::MAX, 1).widen(5).left, i32::MIN);
    }

    #[test]
    fn test_font_options_order() {
        let mut registry = FontRegistry::new();
        registry
            .register_custom_url("My Script", "blob:http://localhost/1234")
            .unwrap();

        let options = registry.font_options();
        assert_eq!(&options[..3], ["Arial", "Times New Roman", "Courier New"]);
        assert_eq!(options[3], "Inter");
        assert_eq!(options.last().map(String::as_str), Some("My Script"));
        assert_eq!(options.len(), 3 + WEB_FAMILIES.len() + 1);
    }

    #[test]
    fn test_unloaded_family_uses_bitmap_fallback() {
        let registry = FontRegistry::new();
        let resolved = registry
            .resolve("Arial", FontWeight::BOLD, FontStyle::Italic)
            .unwrap();
        assert!(matches!(resolved.face, Face::Bitmap(_)));
        assert!(resolved.synthetic_bold);
        assert!(resolved.synthetic_italic);
    }

    #[test]
    fn test_without_fallback_resolves_nothing() {
        let registry = FontRegistry::without_fallback();
        assert!(registry
            .resolve("Arial", FontWeight::NORMAL, FontStyle::Normal)
            .is_none());
    }

    #[test]
    fn test_unresolved_custom_url_is_recorded() {
        let mut registry = FontRegistry::new();
        let loaded = registry
            .register_custom_url("Brand", "blob:http://localhost/abc")
            .unwrap();
        assert!(!loaded);
        assert!(!registry.has_faces("Brand"));
        assert_eq!(
            registry.source("brand"),
            Some(&FontSource::Custom {
                url: "blob:http://localhost/abc".into()
            })
        );
    }

    #[test]
    fn test_invalid_font_bytes_rejected() {
        let mut registry = FontRegistry::new();
        let err = registry
            .register_font_bytes("Junk", vec![0u8; 64], FontSource::Custom { url: "mem".into() })
            .unwrap_err();
        assert!(matches!(err, CertError::Font(_)));
    }

    #[test]
    fn test_decode_data_uri() {
        let bytes = decode_data_uri("data:font/ttf;base64,AAEC").unwrap();
        assert_eq!(bytes, vec![0u8, 1, 2]);
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("nonsense").is_err());
    }
}
