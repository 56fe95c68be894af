//! ZIP packaging.
//!
//! Entries are deflated and stamped with the ZIP epoch (1980-01-01) rather
//! than the current time, so the same batch always produces the same bytes.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::entry_names;
use crate::error::{CertError, Result};
use crate::render::RenderedCertificate;

fn zip_error(e: zip::result::ZipError) -> CertError {
    CertError::Package(format!("zip: {}", e))
}

pub fn write_archive(certificates: &[RenderedCertificate]) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, cert) in entry_names(certificates).into_iter().zip(certificates) {
        writer.start_file(name, options).map_err(zip_error)?;
        writer.write_all(&cert.image.bytes)?;
    }

    let cursor = writer.finish().map_err(zip_error)?;
    Ok(cursor.into_inner())
}
