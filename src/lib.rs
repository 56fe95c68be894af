//! # Certforge - Certificate Compositing Library
//!
//! Certforge places styled text over a certificate template image and renders
//! one certificate per attendee. It provides:
//!
//! - **Scaling**: preview-space positions and sizes mapped to the template's
//!   native resolution
//! - **Layout**: greedy word wrapping and alignment
//! - **Rendering**: full-resolution PNG/JPEG certificates
//! - **Batching**: parallel, roster-ordered generation with partial success
//! - **Packaging**: ZIP archives and one-page-per-certificate PDFs
//!
//! ## Quick Start
//!
//! ```no_run
//! use certforge::{
//!     batch::GenerateOptions,
//!     design::{Design, Roster, TextElement},
//!     package::PackageFormat,
//!     project::Project,
//!     render::Template,
//! };
//!
//! let template = Template::from_path("template.png".as_ref())?;
//!
//! let mut design = Design::new();
//! let mut name = TextElement::name_placeholder(320.0, 240.0);
//! name.font_size = 36.0;
//! design.push(name);
//!
//! let roster = Roster::from_text("Ada Lovelace\nGrace Hopper\n");
//! let project = Project::new(Some(template), design, roster);
//!
//! let (package, outcome) = project.package(PackageFormat::Zip, &GenerateOptions::default())?;
//! println!("{}", outcome.summary());
//! std::fs::write(&package.filename, &package.bytes)?;
//!
//! # Ok::<(), certforge::error::CertError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`geometry`] | Preview ↔ output scaling |
//! | [`design`] | Elements, presets, roster, persisted state |
//! | [`font`] | Injectable font registry |
//! | [`layout`] | Line breaking and placement |
//! | [`render`] | Rasterizer and image encoding |
//! | [`batch`] | Per-attendee generation |
//! | [`package`] | ZIP and PDF packaging |
//! | [`project`] | Facade and project files |
//! | [`config`] | Render and package settings |
//! | [`error`] | Error types |

pub mod batch;
pub mod config;
pub mod design;
pub mod error;
pub mod font;
pub mod geometry;
pub mod layout;
pub mod package;
pub mod project;
pub mod render;

// Re-exports for convenience
pub use error::CertError;
pub use project::{Project, ProjectFile};
pub use render::{RenderedCertificate, Template};
