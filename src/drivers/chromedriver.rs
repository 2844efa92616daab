//! Chromedriver, served from the Chrome for Testing endpoints.

use crate::platform::{OsFamily, Platform};
use regex::Regex;
use std::sync::LazyLock;

pub const DRIVER_NAME: &str = "chromedriver";

pub const LATEST_RELEASE_URL: &str =
    "https://googlechromelabs.github.io/chrome-for-testing/LATEST_RELEASE_STABLE";

// The archive nests the executable in a `chromedriver-<platform>/` directory.
pub const URL_TEMPLATE: &str =
    "https://storage.googleapis.com/chrome-for-testing-public/{version}/{platform}/chromedriver-{platform}.zip";

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+\.\d+").expect("chrome version pattern compiles"));

pub fn version_pattern() -> &'static Regex {
    &VERSION_PATTERN
}

/// Platform identifiers used by the Chrome for Testing buckets.
pub fn platform_token(platform: Platform) -> &'static str {
    match platform.os() {
        OsFamily::MacOs => "mac-x64",
        OsFamily::Windows | OsFamily::Linux => platform.token(),
    }
}
