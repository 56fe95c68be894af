//! Attendee roster: the ordered list of names that drives batch generation.
//!
//! Order is preserved and duplicates are kept; two attendees called "John"
//! get two certificates.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CertError, Result};

/// Serialized as a plain array of names. Deserializing goes through
/// [`Roster::new`], so names are trimmed and blanks dropped there too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Roster {
    names: Vec<String>,
}

impl From<Vec<String>> for Roster {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<Roster> for Vec<String> {
    fn from(roster: Roster) -> Self {
        roster.names
    }
}

impl Roster {
    /// Build a roster from names, dropping blank entries.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names
            .into_iter()
            .map(Into::into)
            .map(|n: String| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        Self { names }
    }

    /// One name per line; blank lines are skipped.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// A JSON array of names, or an object whose string values are names.
    /// Non-string entries are ignored.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| CertError::InvalidInput(format!("invalid attendee JSON: {}", e)))?;

        let names: Vec<String> = match value {
            serde_json::Value::Array(items) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            serde_json::Value::Object(map) => map
                .into_iter()
                .filter_map(|(_, v)| v.as_str().map(str::to_string))
                .collect(),
            _ => {
                return Err(CertError::InvalidInput(
                    "attendee JSON must be an array or an object".into(),
                ));
            }
        };

        Ok(Self::new(names))
    }

    /// Load a roster file: `.json` is parsed as JSON, anything else as text.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json(&content)
        } else {
            Ok(Self::from_text(&content))
        }
    }

    /// Newline-separated form, as persisted by the designer.
    pub fn to_text(&self) -> String {
        self.names.join("\n")
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Keep a preview index inside the roster.
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.names.len().saturating_sub(1))
    }
}
