//! Driver version strings and version requests.

use crate::error::{DriverError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Most components a published driver version carries (`MAJOR.MINOR.PATCH.BUILD`).
const MAX_COMPONENTS: usize = 4;

/// A validated driver version.
///
/// The published string is kept verbatim because it is what download URLs and
/// cache directories are built from. [`DriverVersion::normalized`] gives the
/// three-component form used for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DriverVersion {
    raw: String,
    components: Vec<u64>,
}

impl DriverVersion {
    /// Checks the shape of `version`: one to four dot-separated numeric groups.
    ///
    /// Whether the vendor actually publishes this version is only discovered
    /// when the archive is downloaded.
    pub fn parse(version: &str) -> Result<Self> {
        let invalid = |reason: &str| DriverError::InvalidVersion {
            version: version.to_string(),
            reason: reason.to_string(),
        };

        let raw = version.trim();
        if raw.is_empty() {
            return Err(invalid("version is empty"));
        }

        let groups: Vec<&str> = raw.split('.').collect();
        if groups.len() > MAX_COMPONENTS {
            return Err(invalid("expected at most four dot-separated components"));
        }

        let components = groups
            .iter()
            .map(|group| {
                if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid("components must be non-empty decimal numbers"));
                }
                group
                    .parse::<u64>()
                    .map_err(|_| invalid("component is out of range"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: raw.to_string(),
            components,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn major(&self) -> u64 {
        self.component(0)
    }

    /// `MAJOR.MINOR.PATCH`, padding missing components with zero and dropping
    /// any build number.
    pub fn normalized(&self) -> String {
        format!("{}.{}.{}", self.component(0), self.component(1), self.component(2))
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl Ord for DriverVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (0..MAX_COMPONENTS)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for DriverVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DriverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for DriverVersion {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DriverVersion {
    type Error = DriverError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<DriverVersion> for String {
    fn from(value: DriverVersion) -> Self {
        value.raw
    }
}

/// What the caller asked for: the newest stable driver, or one exact version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VersionRequest {
    #[default]
    Latest,
    Exact(String),
}

impl VersionRequest {
    /// `"latest"` (any case) or an empty string request the newest driver;
    /// anything else is taken literally and validated during resolution.
    pub fn parse(requested: &str) -> Self {
        let trimmed = requested.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("latest") {
            Self::Latest
        } else {
            Self::Exact(trimmed.to_string())
        }
    }
}

impl From<&str> for VersionRequest {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}
