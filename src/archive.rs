//! Pulls the driver executable out of a downloaded archive.
//!
//! Everything happens in memory: the caller either gets the complete
//! executable bytes or an error, never a half-unpacked directory.

use crate::error::{DriverError, Result};
use flate2::read::GzDecoder;
use std::io::{Cursor, Read};
use std::path::Path;

/// Upper bound on an extracted executable. Real drivers are a few tens of
/// megabytes; anything above this is a corrupt or hostile archive.
pub const MAX_EXECUTABLE_SIZE: u64 = 512 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    Tar,
}

impl ArchiveFormat {
    /// Sniffs the container format from its leading bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [b'P', b'K', 0x03, 0x04, ..] | [b'P', b'K', 0x05, 0x06, ..] => Some(Self::Zip),
            [0x1F, 0x8B, ..] => Some(Self::TarGz),
            _ if bytes.get(257..262) == Some(b"ustar".as_slice()) => Some(Self::Tar),
            _ => None,
        }
    }
}

/// Returns the contents of the entry named `executable_name`, wherever it sits
/// in the archive (archives often wrap it in a top-level directory).
///
/// The decoding is synchronous; async callers should run it on
/// `spawn_blocking`.
pub fn extract_executable(archive: &[u8], executable_name: &str) -> Result<Vec<u8>> {
    let format = ArchiveFormat::detect(archive)
        .ok_or_else(|| DriverError::extraction(executable_name, "unrecognised archive format"))?;

    let contents = match format {
        ArchiveFormat::Zip => extract_from_zip(archive, executable_name)?,
        ArchiveFormat::TarGz => extract_from_tar(GzDecoder::new(archive), executable_name)?,
        ArchiveFormat::Tar => extract_from_tar(archive, executable_name)?,
    };

    match contents {
        Some(bytes) if bytes.is_empty() => Err(DriverError::extraction(
            executable_name,
            "archive entry is empty",
        )),
        Some(bytes) => Ok(bytes),
        None => Err(DriverError::extraction(
            executable_name,
            "no such entry in the archive",
        )),
    }
}

fn extract_from_zip(archive: &[u8], executable_name: &str) -> Result<Option<Vec<u8>>> {
    let zip_err = |e: zip::result::ZipError| DriverError::extraction(executable_name, e.to_string());

    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).map_err(zip_err)?;

    for i in 0..zip.len() {
        let mut file = zip.by_index(i).map_err(zip_err)?;
        if file.is_dir() {
            continue;
        }

        let matches = file
            .enclosed_name()
            .is_some_and(|path| file_name_is(&path, executable_name));
        if !matches {
            continue;
        }

        check_declared_size(file.size(), executable_name)?;
        return read_bounded(&mut file, executable_name).map(Some);
    }

    Ok(None)
}

fn extract_from_tar<R: Read>(reader: R, executable_name: &str) -> Result<Option<Vec<u8>>> {
    let io_err = |e: std::io::Error| DriverError::extraction(executable_name, e.to_string());

    let mut tar = tar::Archive::new(reader);
    for entry in tar.entries().map_err(io_err)? {
        let mut entry = entry.map_err(io_err)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let matches = file_name_is(&entry.path().map_err(io_err)?, executable_name);
        if !matches {
            continue;
        }

        check_declared_size(entry.header().size().map_err(io_err)?, executable_name)?;
        return read_bounded(&mut entry, executable_name).map(Some);
    }

    Ok(None)
}

/// Header sizes are untrusted: they only serve to reject early, never to
/// size a buffer.
fn check_declared_size(declared: u64, executable_name: &str) -> Result<()> {
    if declared > MAX_EXECUTABLE_SIZE {
        return Err(DriverError::extraction(
            executable_name,
            format!("entry declares {declared} bytes, more than the {MAX_EXECUTABLE_SIZE} byte limit"),
        ));
    }
    Ok(())
}

fn read_bounded<R: Read>(reader: R, executable_name: &str) -> Result<Vec<u8>> {
    let mut contents = Vec::new();
    reader
        .take(MAX_EXECUTABLE_SIZE + 1)
        .read_to_end(&mut contents)
        .map_err(|e| DriverError::extraction(executable_name, e.to_string()))?;
    if contents.len() as u64 > MAX_EXECUTABLE_SIZE {
        return Err(DriverError::extraction(
            executable_name,
            format!("entry exceeds the {MAX_EXECUTABLE_SIZE} byte limit"),
        ));
    }
    Ok(contents)
}

fn file_name_is(path: &Path, name: &str) -> bool {
    path.file_name().and_then(|n| n.to_str()) == Some(name)
}
