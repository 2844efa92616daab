//! Helpers shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::Mutex;
use webdriver_cache::{DriverError, Platform, Result, Transport};
use zip::write::SimpleFileOptions;

pub const DRIVER_BYTES: &[u8] = b"\x7fELF pretend this is a driver";

enum Reply {
    Body(Bytes),
    Status(u16),
}

/// In-memory transport that records every URL it is asked for.
/// Unknown URLs answer 404, like the vendor buckets do.
#[derive(Default)]
pub struct RecordingTransport {
    routes: HashMap<String, Reply>,
    requests: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.routes.insert(url.into(), Reply::Body(body.into()));
        self
    }

    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.routes.insert(url.into(), Reply::Status(status));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        self.requests.lock().unwrap().push(url.to_string());
        let status = match self.routes.get(url) {
            Some(Reply::Body(body)) => return Ok(body.clone()),
            Some(Reply::Status(status)) => *status,
            None => 404,
        };
        Err(DriverError::Download {
            url: url.to_string(),
            status_code: Some(status),
            timeout: false,
            reason: format!("server responded with {status}"),
            source: None,
        })
    }
}

/// A zip laid out like the msedgedriver downloads.
pub fn edge_zip(platform: Platform) -> Bytes {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("Driver_Notes/credits.html", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"<html></html>").unwrap();
    writer
        .start_file(platform.executable_name("msedgedriver"), SimpleFileOptions::default())
        .unwrap();
    writer.write_all(DRIVER_BYTES).unwrap();
    Bytes::from(writer.finish().unwrap().into_inner())
}

/// A gzipped tar holding a single `geckodriver`.
pub fn gecko_tar_gz() -> Bytes {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    let mut header = tar::Header::new_gnu();
    header.set_size(DRIVER_BYTES.len() as u64);
    header.set_mode(0o755);
    builder.append_data(&mut header, "geckodriver", DRIVER_BYTES).unwrap();
    Bytes::from(builder.into_inner().unwrap().finish().unwrap())
}

/// UTF-16LE with a byte order mark, as the Edge `LATEST_STABLE` file is served.
pub fn utf16_le(text: &str) -> Bytes {
    let mut out = vec![0xFF, 0xFE];
    out.extend(text.encode_utf16().flat_map(|u| u.to_le_bytes()));
    Bytes::from(out)
}

#[cfg(unix)]
pub fn is_executable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_executable(path: &std::path::Path) -> bool {
    path.is_file()
}
