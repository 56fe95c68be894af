//! Font presets: reusable style snapshots exchanged as small JSON documents.
//!
//! ```json
//! {
//!   "name": "Gold Title",
//!   "properties": {
//!     "fontSize": 36, "fontFamily": "Playfair Display", "color": "#b8860b",
//!     "fontWeight": "bold", "fontStyle": "normal", "textDecoration": "none",
//!     "textAlign": "center", "lineHeight": 1.2
//!   },
//!   "createdAt": "2024-05-01T10:00:00+00:00"
//! }
//! ```
//!
//! Applying a preset touches style attributes only; position, kind and text
//! stay as they were.

use serde::{Deserialize, Serialize};

use super::style::{Color, FontStyle, FontWeight, TextAlign, TextDecoration};
use super::TextElement;
use crate::error::{CertError, Result};

/// The style attributes a preset carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProperties {
    pub font_size: f32,
    pub font_family: String,
    pub color: Color,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_decoration: TextDecoration,
    pub text_align: TextAlign,
    pub line_height: f32,
}

impl TextProperties {
    /// Copy the style of `element`. Numeric weights are stored as `normal`.
    pub fn from_element(element: &TextElement) -> Self {
        let font_weight = match element.font_weight {
            FontWeight::Numeric(_) => FontWeight::NORMAL,
            keyword => keyword,
        };

        Self {
            font_size: element.font_size,
            font_family: element.font_family.clone(),
            color: element.color,
            font_weight,
            font_style: element.font_style,
            text_decoration: element.text_decoration,
            text_align: element.text_align,
            line_height: element.line_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontPreset {
    pub name: String,
    pub properties: TextProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl FontPreset {
    /// Snapshot `element`'s style under `name`, stamped with the current time.
    pub fn capture(name: impl Into<String>, element: &TextElement) -> Self {
        Self {
            name: name.into(),
            properties: TextProperties::from_element(element),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CertError::InvalidInput(format!("invalid font preset: {}", e)))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Overwrite `element`'s style attributes with this preset.
    pub fn apply_to(&self, element: &mut TextElement) {
        let p = &self.properties;
        element.font_size = p.font_size;
        element.font_family = p.font_family.clone();
        element.color = p.color;
        element.font_weight = p.font_weight;
        element.font_style = p.font_style;
        element.text_decoration = p.text_decoration;
        element.text_align = p.text_align;
        element.line_height = p.line_height;
    }

    /// `"Gold Title"` → `"gold-title-preset.json"`.
    pub fn suggested_filename(&self) -> String {
        let slug = self
            .name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        format!("{}-preset.json", slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::ElementKind;

    fn styled_element() -> TextElement {
        let mut el = TextElement::new(ElementKind::Static);
        el.font_size = 36.0;
        el.font_family = "Playfair Display".into();
        el.color = "#b8860b".parse().unwrap();
        el.font_weight = FontWeight::BOLD;
        el.text_align = TextAlign::Center;
        el
    }

    #[test]
    fn test_apply_leaves_position_kind_text() {
        let preset = FontPreset::capture("Gold Title", &styled_element());

        let mut target = TextElement::name_placeholder(12.0, 34.0);
        target.text = "keep me".into();
        preset.apply_to(&mut target);

        assert_eq!(target.font_size, 36.0);
        assert_eq!(target.font_family, "Playfair Display");
        assert_eq!(target.font_weight, FontWeight::BOLD);
        assert_eq!(target.text_align, TextAlign::Center);
        assert_eq!((target.x, target.y), (12.0, 34.0));
        assert_eq!(target.kind, ElementKind::Name);
        assert_eq!(target.text, "keep me");
    }

    #[test]
    fn test_numeric_weight_collapses_to_normal() {
        let mut el = styled_element();
        el.font_weight = FontWeight::Numeric(650);
        let props = TextProperties::from_element(&el);
        assert_eq!(props.font_weight, FontWeight::NORMAL);
    }

    #[test]
    fn test_parse_preset_document() {
        let json = r##"{
            "name": "Plain",
            "properties": {
                "fontSize": 18, "fontFamily": "Arial", "color": "#000000",
                "fontWeight": "normal", "fontStyle": "italic",
                "textDecoration": "underline", "textAlign": "right", "lineHeight": 1.4
            },
            "createdAt": "2024-05-01T10:00:00.000Z"
        }"##;

        let preset = FontPreset::from_json(json).unwrap();
        assert_eq!(preset.properties.font_style, FontStyle::Italic);
        assert_eq!(preset.properties.text_decoration, TextDecoration::Underline);
        assert_eq!(preset.properties.text_align, TextAlign::Right);
    }

    #[test]
    fn test_preset_without_properties_is_rejected() {
        let err = FontPreset::from_json(r#"{"name":"broken"}"#).unwrap_err();
        assert!(matches!(err, CertError::InvalidInput(_)));
    }

    #[test]
    fn test_suggested_filename() {
        let preset = FontPreset::capture("Gold  Title Large", &styled_element());
        assert_eq!(preset.suggested_filename(), "gold-title-large-preset.json");
    }

    #[test]
    fn test_json_roundtrip_keeps_properties() {
        let preset = FontPreset::capture("Gold", &styled_element());
        let back = FontPreset::from_json(&preset.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, preset);
    }
}
