//! The designer's persisted keys, read as constructor inputs.
//!
//! | Key | Holds |
//! |-----|-------|
//! | `certificateImageUrl` | template as a `data:` URI |
//! | `attendeeList` | roster, one name per line |
//! | `customFonts` | JSON object of font name → URL |
//!
//! The core only reads these; the UI owns writing them.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Roster;
use crate::error::Result;
use crate::font::FontRegistry;
use crate::render::Template;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredState {
    #[serde(default)]
    pub certificate_image_url: Option<String>,
    #[serde(default)]
    pub attendee_list: Option<String>,
    /// Stored as a JSON string, exactly as the browser keeps it.
    #[serde(default)]
    pub custom_fonts: Option<String>,
}

impl StoredState {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The stored template, if one was saved.
    pub fn template(&self) -> Result<Option<Template>> {
        match self.certificate_image_url.as_deref() {
            Some(uri) if !uri.is_empty() => Template::from_data_uri(uri).map(Some),
            _ => Ok(None),
        }
    }

    pub fn roster(&self) -> Roster {
        self.attendee_list
            .as_deref()
            .map(Roster::from_text)
            .unwrap_or_default()
    }

    /// Parsed `customFonts`; an unreadable value counts as no fonts.
    pub fn custom_fonts(&self) -> BTreeMap<String, String> {
        let Some(raw) = self.custom_fonts.as_deref() else {
            return BTreeMap::new();
        };
        serde_json::from_str(raw).unwrap_or_else(|e| {
            warn!("ignoring unreadable customFonts entry: {}", e);
            BTreeMap::new()
        })
    }

    /// Register every stored custom font. Returns how many loaded faces.
    pub fn register_fonts(&self, registry: &mut FontRegistry) -> usize {
        let mut loaded = 0;
        for (name, url) in self.custom_fonts() {
            match registry.register_custom_url(&name, &url) {
                Ok(true) => loaded += 1,
                Ok(false) => {}
                Err(e) => warn!("custom font {} could not be loaded: {}", name, e),
            }
        }
        loaded
    }
}
