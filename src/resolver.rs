//! Turns a [`VersionRequest`] into a concrete [`DriverVersion`].

use crate::drivers::DriverSource;
use crate::error::{DriverError, Result};
use crate::version::{DriverVersion, VersionRequest};
use crate::Transport;
use tracing::{debug, info};

const LOG_TARGET: &str = "webdriver_cache::resolver";

pub struct VersionResolver<'a> {
    transport: &'a dyn Transport,
}

impl<'a> VersionResolver<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Exact requests are only shape-checked and never touch the network.
    /// `Latest` reads the source's stable-release endpoint and applies its
    /// version pattern; there is no fallback to an older version.
    pub async fn resolve(&self, source: &DriverSource, requested: &VersionRequest) -> Result<DriverVersion> {
        match requested {
            VersionRequest::Exact(raw) => DriverVersion::parse(raw),
            VersionRequest::Latest => self.resolve_latest(source).await,
        }
    }

    async fn resolve_latest(&self, source: &DriverSource) -> Result<DriverVersion> {
        let url = source.latest_release_url();
        let failure = |reason: String| DriverError::VersionResolution {
            browser: source.browser().to_string(),
            url: url.to_string(),
            status_code: None,
            reason,
            source: None,
        };

        let body = self.transport.fetch(url).await.map_err(|e| DriverError::VersionResolution {
            browser: source.browser().to_string(),
            url: url.to_string(),
            status_code: e.status_code(),
            reason: e.to_string(),
            source: Some(Box::new(e)),
        })?;
        let text = decode_text(&body);
        debug!(target: LOG_TARGET, url, text = %text.trim(), "release metadata fetched");

        let raw = extract_version(source, &text).map_err(failure)?;
        let version = DriverVersion::parse(&raw).map_err(|e| failure(e.to_string()))?;

        info!(
            target: LOG_TARGET,
            browser = %source.browser(),
            version = %version,
            "resolved latest driver version"
        );
        Ok(version)
    }
}

/// Applies the source pattern to `text`. Capture group 1 wins over the whole
/// match. Zero matches, or several different versions, are errors.
fn extract_version(source: &DriverSource, text: &str) -> std::result::Result<String, String> {
    let pattern = source.version_pattern();
    let mut found: Vec<&str> = pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|m| m.as_str())
        .collect();
    found.sort_unstable();
    found.dedup();

    match found.as_slice() {
        [] => Err(format!("pattern '{}' did not match the release metadata", pattern.as_str())),
        [single] => Ok((*single).to_string()),
        many => Err(format!("release metadata is ambiguous, found versions {}", many.join(", "))),
    }
}

/// Decodes release metadata. The Edge endpoint serves UTF-16 with a byte order
/// mark; other vendors serve UTF-8.
pub fn decode_text(bytes: &[u8]) -> String {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        _ if looks_like_utf16_le(bytes) => decode_utf16(bytes, u16::from_le_bytes),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn looks_like_utf16_le(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes.len() % 2 == 0 && bytes.iter().skip(1).step_by(2).all(|b| *b == 0)
}
