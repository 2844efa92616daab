use thiserror::Error;
use std::path::PathBuf;
use std::io;

/// Result alias for every fallible operation in the crate.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Error type for all possible failures in the library.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Unsupported platform '{token}', expected one of: {expected}")]
    InvalidPlatform {
        token: String,
        expected: String,
    },

    #[error("Invalid driver version '{version}': {reason}")]
    InvalidVersion {
        version: String,
        reason: String,
    },

    #[error("Unknown browser type '{name}', expected one of: {expected}")]
    InvalidBrowser {
        name: String,
        expected: String,
    },

    /// `status_code` and `source` are set when the metadata request itself
    /// failed, and empty when the body did not yield a version.
    #[error("Could not resolve the latest {browser} driver version from '{url}': {reason}")]
    VersionResolution {
        browser: String,
        url: String,
        status_code: Option<u16>,
        reason: String,
        #[source]
        source: Option<Box<DriverError>>,
    },

    #[error("There is no such driver by url {url}")]
    NoSuchDriver {
        url: String,
        status_code: u16,
    },

    #[error("Failed to download '{url}': {reason}")]
    Download {
        url: String,
        status_code: Option<u16>,
        timeout: bool,
        reason: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Failed to extract '{executable}' from the downloaded archive: {reason}")]
    Extraction {
        executable: String,
        reason: String,
    },

    #[error("I/O error writing to the driver cache at '{path}': {source}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid version pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to build the HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Blocking task failed: {0}")]
    BlockingTask(#[from] tokio::task::JoinError),
}

/// Coarse category of a [`DriverError`], for callers that branch on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    InvalidPlatform,
    InvalidBrowser,
    InvalidVersion,
    VersionResolution,
    NoSuchDriver,
    Download,
    Extraction,
    CacheWrite,
    Other,
}

impl DriverError {
    pub fn kind(&self) -> DriverErrorKind {
        match self {
            Self::InvalidPlatform { .. } => DriverErrorKind::InvalidPlatform,
            Self::InvalidBrowser { .. } => DriverErrorKind::InvalidBrowser,
            Self::InvalidVersion { .. } => DriverErrorKind::InvalidVersion,
            Self::VersionResolution { .. } => DriverErrorKind::VersionResolution,
            Self::NoSuchDriver { .. } => DriverErrorKind::NoSuchDriver,
            Self::Download { .. } => DriverErrorKind::Download,
            Self::Extraction { .. } => DriverErrorKind::Extraction,
            Self::CacheWrite { .. } => DriverErrorKind::CacheWrite,
            Self::InvalidPattern { .. } | Self::HttpClient(_) | Self::BlockingTask(_) => {
                DriverErrorKind::Other
            }
        }
    }

    /// HTTP status behind the failure, if a response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::NoSuchDriver { status_code, .. } => Some(*status_code),
            Self::Download { status_code, .. } | Self::VersionResolution { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Wraps a transport failure for `url`, keeping the status and timeout flag.
    pub(crate) fn download(url: &str, err: reqwest::Error) -> Self {
        Self::Download {
            url: url.to_string(),
            status_code: err.status().map(|s| s.as_u16()),
            timeout: err.is_timeout(),
            reason: err.to_string(),
            source: Some(err),
        }
    }

    /// A client-error response on a driver URL means the vendor has no such
    /// binary. Everything else is passed through untouched.
    pub(crate) fn into_no_such_driver(self) -> Self {
        match self {
            Self::Download {
                url,
                status_code: Some(code),
                ..
            } if (400..500).contains(&code) => Self::NoSuchDriver {
                url,
                status_code: code,
            },
            other => other,
        }
    }

    pub(crate) fn cache_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::CacheWrite {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn extraction(executable: &str, reason: impl Into<String>) -> Self {
        Self::Extraction {
            executable: executable.to_string(),
            reason: reason.into(),
        }
    }
}
