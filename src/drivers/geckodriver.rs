//! Mozilla geckodriver, released on GitHub.

use crate::platform::{OsFamily, Platform};
use regex::Regex;
use std::sync::LazyLock;

pub const DRIVER_NAME: &str = "geckodriver";

/// GitHub API document describing the latest release; the version is read
/// from its `tag_name`.
pub const LATEST_RELEASE_URL: &str = "https://api.github.com/repos/mozilla/geckodriver/releases/latest";

pub const URL_TEMPLATE: &str =
    "https://github.com/mozilla/geckodriver/releases/download/v{version}/geckodriver-v{version}-{platform}.{archive}";

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""tag_name"\s*:\s*"v(\d+\.\d+\.\d+)""#).expect("gecko version pattern compiles")
});

pub fn version_pattern() -> &'static Regex {
    &VERSION_PATTERN
}

pub fn platform_token(platform: Platform) -> &'static str {
    match platform.os() {
        OsFamily::MacOs => "macos",
        OsFamily::Windows | OsFamily::Linux => platform.token(),
    }
}

/// Windows builds ship as zip, everything else as gzipped tar.
pub fn archive_extension(platform: Platform) -> &'static str {
    if platform.is_windows() { "zip" } else { "tar.gz" }
}
