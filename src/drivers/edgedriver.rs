//! Microsoft Edge (Chromium) driver, published as `msedgedriver`.

use crate::platform::Platform;
use regex::Regex;
use std::sync::LazyLock;

pub const DRIVER_NAME: &str = "msedgedriver";

/// Plain-text (UTF-16) file holding the current stable driver version.
pub const LATEST_RELEASE_URL: &str = "https://msedgedriver.azureedge.net/LATEST_STABLE";

pub const URL_TEMPLATE: &str = "https://msedgedriver.azureedge.net/{version}/edgedriver_{platform}.zip";

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+(?:\.\d+)?").expect("edge version pattern compiles"));

pub fn version_pattern() -> &'static Regex {
    &VERSION_PATTERN
}

/// Edge uses the generic tokens unchanged.
pub fn platform_token(platform: Platform) -> &'static str {
    platform.token()
}
