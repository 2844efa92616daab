//! Per-browser driver sources: where the latest version is published, how the
//! download URL is built and what the executable is called.

pub mod chromedriver;
pub mod edgedriver;
pub mod geckodriver;

use crate::error::{DriverError, Result};
use crate::platform::Platform;
use crate::version::DriverVersion;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Driver family. Each maps to exactly one [`DriverSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    Edge,
    Chrome,
    Firefox,
}

impl BrowserType {
    pub const ALL: [Self; 3] = [Self::Edge, Self::Chrome, Self::Firefox];

    /// Directory name used for this family inside the cache.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Edge => "edge",
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
        }
    }

    /// Executable stem of the driver (e.g., "msedgedriver").
    pub const fn driver_name(&self) -> &'static str {
        match self {
            Self::Edge => edgedriver::DRIVER_NAME,
            Self::Chrome => chromedriver::DRIVER_NAME,
            Self::Firefox => geckodriver::DRIVER_NAME,
        }
    }

    fn platform_token(&self, platform: Platform) -> &'static str {
        match self {
            Self::Edge => edgedriver::platform_token(platform),
            Self::Chrome => chromedriver::platform_token(platform),
            Self::Firefox => geckodriver::platform_token(platform),
        }
    }

    fn archive_extension(&self, platform: Platform) -> &'static str {
        match self {
            Self::Firefox => geckodriver::archive_extension(platform),
            Self::Edge | Self::Chrome => "zip",
        }
    }
}

impl fmt::Display for BrowserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BrowserType {
    type Err = DriverError;

    /// Accepts the family name or the driver name, in any case.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s) || b.driver_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DriverError::InvalidBrowser {
                name: s.to_string(),
                expected: Self::ALL.map(|b| b.name()).join(", "),
            })
    }
}

/// Remote endpoints and naming rules for one driver family.
///
/// The URL template understands three placeholders: `{version}`, `{platform}`
/// (the family's own platform spelling) and `{archive}` (`zip` or `tar.gz`).
#[derive(Debug, Clone)]
pub struct DriverSource {
    browser: BrowserType,
    latest_release_url: String,
    url_template: String,
    version_pattern: Regex,
}

impl DriverSource {
    /// The built-in vendor endpoints for `browser`.
    pub fn for_browser(browser: BrowserType) -> Self {
        let (latest, template, pattern) = match browser {
            BrowserType::Edge => (
                edgedriver::LATEST_RELEASE_URL,
                edgedriver::URL_TEMPLATE,
                edgedriver::version_pattern(),
            ),
            BrowserType::Chrome => (
                chromedriver::LATEST_RELEASE_URL,
                chromedriver::URL_TEMPLATE,
                chromedriver::version_pattern(),
            ),
            BrowserType::Firefox => (
                geckodriver::LATEST_RELEASE_URL,
                geckodriver::URL_TEMPLATE,
                geckodriver::version_pattern(),
            ),
        };
        Self {
            browser,
            latest_release_url: latest.to_string(),
            url_template: template.to_string(),
            version_pattern: pattern.clone(),
        }
    }

    /// Replaces the stable-release metadata endpoint.
    pub fn with_latest_release_url(mut self, url: impl Into<String>) -> Self {
        self.latest_release_url = url.into();
        self
    }

    /// Replaces the download URL template.
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    /// Replaces the pattern used to pull the version out of the metadata.
    pub fn with_version_pattern(mut self, pattern: &str) -> Result<Self> {
        self.version_pattern = Regex::new(pattern).map_err(|source| DriverError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self)
    }

    pub fn browser(&self) -> BrowserType {
        self.browser
    }

    pub fn latest_release_url(&self) -> &str {
        &self.latest_release_url
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    pub fn version_pattern(&self) -> &Regex {
        &self.version_pattern
    }

    /// Name of the driver executable inside the archive for `platform`.
    pub fn executable_name(&self, platform: Platform) -> String {
        platform.executable_name(self.browser.driver_name())
    }

    /// Builds the archive URL for `version` on `platform`. Pure string
    /// substitution; reachability is the transport's concern.
    pub fn download_url(&self, version: &DriverVersion, platform: Platform) -> String {
        self.url_template
            .replace("{version}", version.as_str())
            .replace("{platform}", self.browser.platform_token(platform))
            .replace("{archive}", self.browser.archive_extension(platform))
    }
}
