//! # Packager
//!
//! Bundles a batch's certificates into a single deliverable.
//!
//! | Format | Layout | Default filename |
//! |--------|--------|------------------|
//! | ZIP | one `certificate_<name>.<ext>` entry per certificate | `certificates.zip` |
//! | PDF | one page per certificate, oriented to the image | `Certificates.pdf` |
//!
//! Entries and pages follow the input order, which the batch keeps equal to
//! roster order. An empty input is an error rather than an empty package.

pub mod archive;
pub mod pdf;

use log::info;
use std::collections::HashSet;
use std::str::FromStr;

use crate::config::PackageConfig;
use crate::error::{CertError, Result};
use crate::render::RenderedCertificate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PackageFormat {
    #[default]
    Zip,
    Pdf,
}

impl PackageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            PackageFormat::Zip => "zip",
            PackageFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            PackageFormat::Zip => "application/zip",
            PackageFormat::Pdf => "application/pdf",
        }
    }
}

impl FromStr for PackageFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zip" => Ok(PackageFormat::Zip),
            "pdf" => Ok(PackageFormat::Pdf),
            other => Err(format!("unknown package format {:?} (expected zip or pdf)", other)),
        }
    }
}

/// A finished deliverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub format: PackageFormat,
}

impl Package {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Bundle `certificates`, in order, as `format`.
pub fn package(
    certificates: &[RenderedCertificate],
    format: PackageFormat,
    config: &PackageConfig,
) -> Result<Package> {
    if certificates.is_empty() {
        return Err(CertError::NothingToPackage);
    }

    let (bytes, filename) = match format {
        PackageFormat::Zip => (archive::write_archive(certificates)?, config.archive_name.clone()),
        PackageFormat::Pdf => (pdf::write_document(certificates, config)?, config.document_name.clone()),
    };

    info!(
        "packaged {} certificates into {} ({} bytes)",
        certificates.len(),
        filename,
        bytes.len()
    );
    Ok(Package {
        bytes,
        filename,
        format,
    })
}

/// Archive entry names for `certificates`, unique and in order.
///
/// A repeated name gets the certificate's 1-based position appended
/// (`certificate_John_2.png`); path separators become `_`.
pub fn entry_names(certificates: &[RenderedCertificate]) -> Vec<String> {
    let mut used = HashSet::new();
    let mut names = Vec::with_capacity(certificates.len());

    for (i, cert) in certificates.iter().enumerate() {
        let stem: String = cert
            .attendee
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        let ext = cert.image.format.extension();

        let mut candidate = format!("certificate_{}.{}", stem, ext);
        let mut suffix = i + 1;
        while used.contains(&candidate) {
            candidate = format!("certificate_{}_{}.{}", stem, suffix, ext);
            suffix += 1;
        }
        used.insert(candidate.clone());
        names.push(candidate);
    }

    names
}
