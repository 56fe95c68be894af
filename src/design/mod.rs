//! # Certificate Design
//!
//! The data model the designer hands to the renderer: an ordered list of
//! positioned, styled text elements. Positions and font sizes are in preview
//! space (see [`crate::geometry`]).
//!
//! ## Element kinds
//!
//! | Kind | Rendered text |
//! |------|---------------|
//! | `name` | the attendee's name, for every attendee |
//! | `static` | the element's literal `text`, identical for every attendee |
//!
//! ## JSON
//!
//! Elements use the designer's camelCase field names:
//!
//! ```json
//! {
//!   "id": "title",
//!   "type": "static",
//!   "text": "Certificate of Attendance",
//!   "x": 120, "y": 60,
//!   "fontSize": 32,
//!   "fontFamily": "Playfair Display",
//!   "color": "#1e1e1e",
//!   "fontWeight": "bold",
//!   "textAlign": "center",
//!   "individualAdjustments": { "Jane Smith": { "x": 4, "y": -2 } }
//! }
//! ```

pub mod preset;
pub mod roster;
pub mod stored;
pub mod style;

pub use preset::{FontPreset, TextProperties};
pub use roster::Roster;
pub use stored::StoredState;
pub use style::{Color, FontStyle, FontWeight, TextAlign, TextDecoration, WeightKeyword};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Whether an element is substituted per attendee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Replaced by the attendee's name.
    Name,
    /// Fixed literal text.
    Static,
}

/// Per-attendee positional nudge, in preview pixels.
///
/// Accepts the designer's `{x, y}` spelling as well as `{dx, dy}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    #[serde(alias = "x")]
    pub dx: f32,
    #[serde(alias = "y")]
    pub dy: f32,
}

fn new_element_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_font_size() -> f32 {
    24.0
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_line_height() -> f32 {
    1.2
}

/// One placed text field on the certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    #[serde(default = "new_element_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Literal content; ignored for `name` elements.
    #[serde(default)]
    pub text: String,
    /// Top-left anchor in preview space.
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub text_decoration: TextDecoration,
    #[serde(default)]
    pub text_align: TextAlign,
    /// Line height multiplier.
    #[serde(default = "default_line_height")]
    pub line_height: f32,
    /// Wrapping width in preview space. `None` wraps at the template edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub individual_adjustments: BTreeMap<String, Adjustment>,
}

impl TextElement {
    /// Create an element with the designer's starter values and a fresh id.
    pub fn new(kind: ElementKind) -> Self {
        let text = match kind {
            ElementKind::Name => "Attendee Name",
            ElementKind::Static => "Sample Text",
        };

        Self {
            id: new_element_id(),
            kind,
            text: text.to_string(),
            x: 100.0,
            y: 100.0,
            font_size: default_font_size(),
            font_family: default_font_family(),
            color: Color::BLACK,
            font_weight: FontWeight::NORMAL,
            font_style: FontStyle::Normal,
            text_decoration: TextDecoration::None,
            text_align: TextAlign::Left,
            line_height: default_line_height(),
            max_width: None,
            individual_adjustments: BTreeMap::new(),
        }
    }

    /// Shorthand for a static element with `text` at `(x, y)`.
    pub fn static_text(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            ..Self::new(ElementKind::Static)
        }
    }

    /// Shorthand for a name placeholder at `(x, y)`.
    pub fn name_placeholder(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::new(ElementKind::Name)
        }
    }

    pub fn is_name(&self) -> bool {
        self.kind == ElementKind::Name
    }

    /// Text rendered on `attendee`'s certificate.
    pub fn text_for<'a>(&'a self, attendee: &'a str) -> &'a str {
        match self.kind {
            ElementKind::Name => attendee,
            ElementKind::Static => &self.text,
        }
    }

    /// Preview-space anchor for `attendee`, including any adjustment keyed to them.
    pub fn anchor_for(&self, attendee: &str) -> (f32, f32) {
        match self.individual_adjustments.get(attendee) {
            Some(adj) => (self.x + adj.dx, self.y + adj.dy),
            None => (self.x, self.y),
        }
    }
}

/// Ordered element list. Paint order is list order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Design {
    elements: Vec<TextElement>,
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: Vec<TextElement>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[TextElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append a new element with starter values; returns its id.
    pub fn add_element(&mut self, kind: ElementKind) -> String {
        let element = TextElement::new(kind);
        let id = element.id.clone();
        self.elements.push(element);
        id
    }

    /// Append an existing element.
    pub fn push(&mut self, element: TextElement) {
        self.elements.push(element);
    }

    pub fn element(&self, id: &str) -> Option<&TextElement> {
        self.elements.iter().find(|el| el.id == id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut TextElement> {
        self.elements.iter_mut().find(|el| el.id == id)
    }

    /// Remove an element; returns whether it existed.
    pub fn remove_element(&mut self, id: &str) -> bool {
        let before = self.elements.len();
        self.elements.retain(|el| el.id != id);
        self.elements.len() != before
    }

    /// Move an element's template position.
    pub fn move_element(&mut self, id: &str, x: f32, y: f32) -> bool {
        match self.element_mut(id) {
            Some(el) => {
                el.x = x;
                el.y = y;
                true
            }
            None => false,
        }
    }

    /// Nudge an element for one attendee only.
    pub fn set_adjustment(&mut self, id: &str, attendee: &str, dx: f32, dy: f32) -> bool {
        match self.element_mut(id) {
            Some(el) => {
                el.individual_adjustments
                    .insert(attendee.to_string(), Adjustment { dx, dy });
                true
            }
            None => false,
        }
    }

    pub fn clear_adjustment(&mut self, id: &str, attendee: &str) -> bool {
        self.element_mut(id)
            .map(|el| el.individual_adjustments.remove(attendee).is_some())
            .unwrap_or(false)
    }

    pub fn name_placeholder_count(&self) -> usize {
        self.elements.iter().filter(|el| el.is_name()).count()
    }

    pub fn has_name_placeholder(&self) -> bool {
        self.elements.iter().any(TextElement::is_name)
    }
}
