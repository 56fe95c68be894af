//! # Error Types
//!
//! This module defines error types used throughout the certforge library.
//!
//! ## Propagation
//!
//! | Error | Scope | Recovered by |
//! |-------|-------|--------------|
//! | `TemplateUnavailable` | any render | nothing, surfaced immediately |
//! | `PreconditionFailed` | one batch invocation | nothing |
//! | `LayoutUnavailable` | one element | the rasterizer skips the element |
//! | `EncodingFailed` | one certificate | the batch skips the attendee |
//! | `NothingToPackage` | packaging step | nothing |

use thiserror::Error;

/// Main error type for certforge operations
#[derive(Debug, Error)]
pub enum CertError {
    /// No decodable template image at render time
    #[error("Template unavailable: {0}")]
    TemplateUnavailable(String),

    /// Batch requested without attendees or without a name placeholder
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Font metrics could not be obtained for one element
    #[error("Layout unavailable for element {element}: {reason}")]
    LayoutUnavailable { element: String, reason: String },

    /// The composited surface could not be serialized
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    /// Packaging invoked with zero rendered certificates
    #[error("Nothing to package: no certificates were rendered")]
    NothingToPackage,

    /// Malformed roster, preset, project or style value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Font data that could not be parsed
    #[error("Font error: {0}")]
    Font(String),

    /// Archive or document writer failure
    #[error("Package error: {0}")]
    Package(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CertError {
    pub(crate) fn layout(element: &str, reason: impl Into<String>) -> Self {
        CertError::LayoutUnavailable {
            element: element.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CertError {
    fn from(e: serde_json::Error) -> Self {
        CertError::InvalidInput(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CertError>;
