//! # Certforge CLI
//!
//! Command-line interface for certificate rendering.
//!
//! ## Usage
//!
//! ```bash
//! # Render the first attendee's certificate
//! certforge render project.json
//!
//! # Render attendee #3 to a chosen file
//! certforge render project.json --index 3 --output grace.png
//!
//! # Render everyone into a ZIP (or a PDF)
//! certforge batch project.json
//! certforge batch project.json --format pdf --output out.pdf
//!
//! # List font families, including installed ones
//! certforge fonts --system
//!
//! # Save an element's style as a preset, then apply it elsewhere
//! certforge preset save project.json --element title --name "Heading"
//! certforge preset apply project.json --element subtitle --preset heading-preset.json --write
//! ```
//!
//! Set `RUST_LOG=debug` for detailed logging.

use clap::{Parser, Subcommand};
use log::warn;
use std::path::{Path, PathBuf};

use certforge::{
    CertError, Project, ProjectFile,
    batch::GenerateOptions,
    design::FontPreset,
    font::FontRegistry,
    package::PackageFormat,
};

/// Certforge - Certificate rendering utility
#[derive(Parser, Debug)]
#[command(name = "certforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render one attendee's certificate
    Render {
        /// Project file
        project: PathBuf,

        /// Roster index (clamped to the roster)
        #[arg(long, default_value = "0")]
        index: usize,

        /// Output file (defaults to certificate_<name>.<ext>)
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render every attendee and package the results
    Batch {
        /// Project file
        project: PathBuf,

        /// Package format: zip or pdf
        #[arg(long, default_value = "zip")]
        format: PackageFormat,

        /// Output file (defaults to the configured package name)
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Render attendees one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// List known font families
    Fonts {
        /// Also look up installed system fonts
        #[arg(long)]
        system: bool,
    },

    /// Save or apply font presets
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand, Debug)]
enum PresetAction {
    /// Capture an element's style into a preset file
    Save {
        /// Project file
        project: PathBuf,

        /// Element id
        #[arg(long)]
        element: String,

        /// Preset name
        #[arg(long)]
        name: String,

        /// Output file (defaults to <name>-preset.json)
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Apply a preset file to an element
    Apply {
        /// Project file
        project: PathBuf,

        /// Element id
        #[arg(long)]
        element: String,

        /// Preset file
        #[arg(long, value_name = "FILE")]
        preset: PathBuf,

        /// Write the updated project back instead of printing the element
        #[arg(long)]
        write: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), CertError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            project,
            index,
            output,
        } => {
            let project = Project::load(&project)?;
            let certificate = project.render_preview(index)?;
            for skipped in &certificate.skipped {
                warn!("element {} was not drawn: {}", skipped.element_id, skipped.reason);
            }

            let path = output.unwrap_or_else(|| PathBuf::from(certificate.suggested_filename()));
            std::fs::write(&path, &certificate.image.bytes)?;
            println!(
                "Saved {}x{} certificate for {} to {}",
                certificate.image.width,
                certificate.image.height,
                certificate.attendee,
                path.display()
            );
        }

        Commands::Batch {
            project,
            format,
            output,
            sequential,
        } => {
            let project = Project::load(&project)?;
            let options = if sequential {
                GenerateOptions::sequential()
            } else {
                GenerateOptions::default()
            };

            let (package, outcome) = project.package(format, &options)?;
            for failure in &outcome.failures {
                warn!("#{} {}: {}", failure.index + 1, failure.attendee, failure.error);
            }

            let path = output.unwrap_or_else(|| PathBuf::from(&package.filename));
            std::fs::write(&path, &package.bytes)?;
            println!("{}; saved to {}", outcome.summary(), path.display());
        }

        Commands::Fonts { system } => {
            let mut registry = FontRegistry::new();
            if system {
                registry.load_system_fonts();
            }
            for name in registry.font_options() {
                let marker = if registry.has_faces(&name) { "*" } else { " " };
                println!("{} {}", marker, name);
            }
            if system {
                println!("\n* = installed faces found");
            }
        }

        Commands::Preset { action } => run_preset(action)?,
    }

    Ok(())
}

fn unknown_element(id: &str) -> CertError {
    CertError::InvalidInput(format!("no element with id {:?}", id))
}

fn run_preset(action: PresetAction) -> Result<(), CertError> {
    match action {
        PresetAction::Save {
            project,
            element,
            name,
            output,
        } => {
            let file = ProjectFile::load(&project)?;
            let el = file
                .elements
                .element(&element)
                .ok_or_else(|| unknown_element(&element))?;

            let preset = FontPreset::capture(name, el);
            let path = output.unwrap_or_else(|| PathBuf::from(preset.suggested_filename()));
            std::fs::write(&path, preset.to_json_pretty()?)?;
            println!("Saved preset {} to {}", preset.name, path.display());
        }

        PresetAction::Apply {
            project,
            element,
            preset,
            write,
        } => {
            let preset = FontPreset::from_json(&std::fs::read_to_string(&preset)?)?;
            let mut file = ProjectFile::load(&project)?;
            let el = file
                .elements
                .element_mut(&element)
                .ok_or_else(|| unknown_element(&element))?;
            preset.apply_to(el);

            if write {
                file.save(Path::new(&project))?;
                println!("Applied preset {} to {} in {}", preset.name, element, project.display());
            } else {
                println!("{}", serde_json::to_string_pretty(el)?);
            }
        }
    }

    Ok(())
}
