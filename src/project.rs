//! # Project
//!
//! Everything one certificate run needs, held together: template, design,
//! roster, font registry and both configs. The UI (or the CLI) builds a
//! `Project` from its current state and calls into it; the core keeps no
//! state of its own between calls.
//!
//! ## Project file
//!
//! ```json
//! {
//!   "template": "template.png",
//!   "roster": "attendees.txt",
//!   "elements": [
//!     { "type": "name", "text": "Attendee Name", "x": 320, "y": 240,
//!       "fontSize": 36, "textAlign": "center" }
//!   ],
//!   "customFonts": { "Brand": "fonts/Brand.ttf" },
//!   "render": { "format": "png" },
//!   "package": { "pageSize": { "width_mm": 210, "height_mm": 297 } }
//! }
//! ```
//!
//! Relative paths resolve against the project file's directory. Names can
//! also be given inline with `"attendees": ["Ada", "Grace"]`.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::batch::{BatchGenerator, BatchOutcome, GenerateOptions};
use crate::config::{PackageConfig, RenderConfig};
use crate::design::{Design, Roster, StoredState};
use crate::error::{CertError, Result};
use crate::font::FontRegistry;
use crate::geometry::PreviewSize;
use crate::package::{self, Package, PackageFormat};
use crate::render::{Rasterizer, RenderedCertificate, Template};

#[derive(Debug, Clone)]
pub struct Project {
    pub template: Option<Template>,
    pub design: Design,
    pub roster: Roster,
    pub registry: FontRegistry,
    /// Preview the design was laid out in. Derived from the template and
    /// `render.preview_height` when unset.
    pub preview: Option<PreviewSize>,
    pub render: RenderConfig,
    pub package: PackageConfig,
}

impl Project {
    pub fn new(template: Option<Template>, design: Design, roster: Roster) -> Self {
        Self {
            template,
            design,
            roster,
            registry: FontRegistry::new(),
            preview: None,
            render: RenderConfig::default(),
            package: PackageConfig::default(),
        }
    }

    /// Build from the designer's persisted keys.
    pub fn from_stored(state: &StoredState, design: Design) -> Result<Self> {
        let mut project = Self::new(state.template()?, design, state.roster());
        state.register_fonts(&mut project.registry);
        Ok(project)
    }

    pub fn with_registry(mut self, registry: FontRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Preview dimensions used for scaling, if a template is loaded.
    pub fn preview_size(&self) -> Option<PreviewSize> {
        if let Some(preview) = self.preview {
            return Some(preview);
        }
        self.template
            .as_ref()
            .map(|t| PreviewSize::fit_height(t.size(), self.render.preview_height))
    }

    fn rasterizer(&self) -> Rasterizer<'_> {
        Rasterizer::new(&self.registry, &self.render)
    }

    fn generator(&self) -> BatchGenerator<'_> {
        BatchGenerator::new(
            self.rasterizer(),
            self.template.as_ref(),
            self.design.elements(),
            self.preview_size().unwrap_or(PreviewSize::new(0.0, 0.0)),
        )
    }

    /// Render the certificate for roster entry `index` (clamped to the roster).
    pub fn render_preview(&self, index: usize) -> Result<RenderedCertificate> {
        let attendee = self
            .roster
            .get(self.roster.clamp_index(index))
            .ok_or_else(|| CertError::PreconditionFailed("the attendee roster is empty".into()))?;
        let preview = self.preview_size().ok_or_else(|| {
            CertError::TemplateUnavailable("no template image loaded".into())
        })?;

        self.rasterizer()
            .render(self.template.as_ref(), self.design.elements(), preview, attendee)
    }

    /// Render every attendee.
    pub fn generate(&self, options: &GenerateOptions<'_>) -> Result<BatchOutcome> {
        self.generator().run(&self.roster, options)
    }

    /// Render every attendee and bundle the successes.
    pub fn package(
        &self,
        format: PackageFormat,
        options: &GenerateOptions<'_>,
    ) -> Result<(Package, BatchOutcome)> {
        let outcome = self.generate(options)?;
        let package = package::package(&outcome.certificates, format, &self.package)?;
        Ok((package, outcome))
    }
}

/// The on-disk JSON form of a [`Project`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
    #[serde(default)]
    pub elements: Design,
    /// Roster file (`.txt` or `.json`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roster: Option<PathBuf>,
    /// Inline names, used when no roster file is given.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fonts: BTreeMap<String, String>,
    /// Load installed faces for the built-in and web families.
    #[serde(default)]
    pub system_fonts: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<PreviewSize>,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub package: PackageConfig,
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn looks_like_path(url: &str) -> bool {
    !url.contains("://") && !url.starts_with("data:") && !url.starts_with("blob:")
}

impl ProjectFile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n")?;
        Ok(())
    }

    /// Build a [`Project`], resolving relative paths against `base`.
    pub fn into_project(self, base: &Path) -> Result<Project> {
        let template = match &self.template {
            Some(path) => Some(Template::from_path(&resolve(base, path))?),
            None => None,
        };

        let roster = match &self.roster {
            Some(path) => Roster::from_path(&resolve(base, path))?,
            None => Roster::new(self.attendees.iter().map(String::as_str)),
        };

        let mut registry = FontRegistry::new();
        if self.system_fonts {
            registry.load_system_fonts();
        }
        for (name, url) in &self.custom_fonts {
            let url = if looks_like_path(url) {
                resolve(base, Path::new(url)).display().to_string()
            } else {
                url.clone()
            };
            match registry.register_custom_url(name, &url) {
                Ok(true) => info!("loaded custom font {}", name),
                Ok(false) => warn!("custom font {} has no loadable source ({})", name, url),
                Err(e) => warn!("custom font {} could not be loaded: {}", name, e),
            }
        }

        Ok(Project {
            template,
            design: self.elements,
            roster,
            registry,
            preview: self.preview,
            render: self.render,
            package: self.package,
        })
    }
}

impl Project {
    /// Load a project file and everything it points to.
    pub fn load(path: &Path) -> Result<Self> {
        let base = path.parent().unwrap_or(Path::new("."));
        ProjectFile::load(path)?.into_project(base)
    }
}
