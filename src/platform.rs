//! Target platform of a driver binary, parsed from a short token such as `win64`.

use crate::error::{DriverError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Windows,
    MacOs,
    Linux,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchBits {
    Bits32,
    Bits64,
}

/// An operating system family plus bit width.
///
/// Only the combinations listed in [`Platform::TOKENS`] can be constructed, so
/// every value has exactly one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Platform {
    os: OsFamily,
    bits: ArchBits,
}

impl Platform {
    pub const WIN32: Self = Self::new(OsFamily::Windows, ArchBits::Bits32);
    pub const WIN64: Self = Self::new(OsFamily::Windows, ArchBits::Bits64);
    pub const MAC64: Self = Self::new(OsFamily::MacOs, ArchBits::Bits64);
    pub const LINUX32: Self = Self::new(OsFamily::Linux, ArchBits::Bits32);
    pub const LINUX64: Self = Self::new(OsFamily::Linux, ArchBits::Bits64);

    /// Every accepted token.
    pub const TOKENS: [&'static str; 5] = ["win32", "win64", "mac64", "linux32", "linux64"];

    const fn new(os: OsFamily, bits: ArchBits) -> Self {
        Self { os, bits }
    }

    /// Parses one of [`Platform::TOKENS`]. Anything else fails before any I/O.
    pub fn parse(token: &str) -> Result<Self> {
        match token {
            "win32" => Ok(Self::WIN32),
            "win64" => Ok(Self::WIN64),
            "mac64" => Ok(Self::MAC64),
            "linux32" => Ok(Self::LINUX32),
            "linux64" => Ok(Self::LINUX64),
            other => Err(DriverError::InvalidPlatform {
                token: other.to_string(),
                expected: Self::TOKENS.join(", "),
            }),
        }
    }

    /// Maps the host operating system and architecture onto a token.
    pub fn current() -> Result<Self> {
        match (std::env::consts::OS, std::env::consts::ARCH) {
            ("windows", "x86_64" | "aarch64") => Ok(Self::WIN64),
            ("windows", "x86") => Ok(Self::WIN32),
            ("macos", "x86_64" | "aarch64") => Ok(Self::MAC64),
            ("linux", "x86_64") => Ok(Self::LINUX64),
            ("linux", "x86") => Ok(Self::LINUX32),
            (os, arch) => Err(DriverError::InvalidPlatform {
                token: format!("{os}-{arch}"),
                expected: Self::TOKENS.join(", "),
            }),
        }
    }

    pub const fn os(&self) -> OsFamily {
        self.os
    }

    pub const fn bits(&self) -> ArchBits {
        self.bits
    }

    pub const fn is_windows(&self) -> bool {
        matches!(self.os, OsFamily::Windows)
    }

    pub const fn token(&self) -> &'static str {
        match (self.os, self.bits) {
            (OsFamily::Windows, ArchBits::Bits32) => "win32",
            (OsFamily::Windows, ArchBits::Bits64) => "win64",
            (OsFamily::MacOs, _) => "mac64",
            (OsFamily::Linux, ArchBits::Bits32) => "linux32",
            (OsFamily::Linux, ArchBits::Bits64) => "linux64",
        }
    }

    /// File name of an executable called `stem` on this platform.
    pub fn executable_name(&self, stem: &str) -> String {
        if self.is_windows() {
            format!("{stem}.exe")
        } else {
            stem.to_string()
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Platform {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Platform {
    type Error = DriverError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.token().to_string()
    }
}
