//! Per-manager settings, with defaults taken from the environment.
//!
//! The environment is read once, when a [`ManagerConfig`] is built. Nothing
//! here mutates process-wide state, so two managers never share settings by
//! accident.

use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

const LOG_TARGET: &str = "webdriver_cache::config";

/// `0`, `false`, `no` or `off` disable TLS certificate verification.
pub const SSL_VERIFY_ENV: &str = "WDM_SSL_VERIFY";

/// Explicit cache root.
pub const CACHE_DIR_ENV: &str = "WDM_CACHE_DIR";

/// Request timeout in whole seconds.
pub const TIMEOUT_ENV: &str = "WDM_TIMEOUT_SECS";

/// Subdirectory path within the user cache directory.
const CACHE_SUBDIR: &str = "webdriver-manager/drivers";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    pub ssl_verify: bool,
    pub cache_root: PathBuf,
    pub timeout: Duration,
}

impl ManagerConfig {
    /// Built-in defaults with an explicit cache root. Does not read the
    /// environment.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            ssl_verify: true,
            cache_root: cache_root.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Defaults, overridden by `WDM_SSL_VERIFY`, `WDM_CACHE_DIR` and
    /// `WDM_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        Self {
            ssl_verify: ssl_verify_from_env(),
            cache_root: resolve_cache_root(),
            timeout: timeout_from_env(),
        }
    }

    pub fn with_ssl_verify(mut self, ssl_verify: bool) -> Self {
        self.ssl_verify = ssl_verify;
        self
    }

    pub fn with_cache_root(mut self, cache_root: impl Into<PathBuf>) -> Self {
        self.cache_root = cache_root.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Resolves the cache root.
///
/// The resolution order is:
///
/// 1. `WDM_CACHE_DIR` if set
/// 2. `$XDG_CACHE_HOME/webdriver-manager/drivers` if `XDG_CACHE_HOME` is set
/// 3. `~/.cache/webdriver-manager/drivers`
/// 4. `<temp dir>/webdriver-manager/drivers` as last resort
pub fn resolve_cache_root() -> PathBuf {
    if let Some(dir) = non_empty_env(CACHE_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(xdg) = non_empty_env("XDG_CACHE_HOME") {
        return PathBuf::from(xdg).join(CACHE_SUBDIR);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".cache").join(CACHE_SUBDIR);
    }

    std::env::temp_dir().join(CACHE_SUBDIR)
}

fn ssl_verify_from_env() -> bool {
    let Some(raw) = non_empty_env(SSL_VERIFY_ENV) else {
        return true;
    };
    match raw.to_ascii_lowercase().as_str() {
        "0" | "false" | "no" | "off" => false,
        "1" | "true" | "yes" | "on" => true,
        _ => {
            warn!(target: LOG_TARGET, value = %raw, "unrecognised {SSL_VERIFY_ENV}, keeping verification on");
            true
        }
    }
}

fn timeout_from_env() -> Duration {
    let default = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
    let Some(raw) = non_empty_env(TIMEOUT_ENV) else {
        return default;
    };
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            warn!(target: LOG_TARGET, value = %raw, "invalid {TIMEOUT_ENV}, using default timeout");
            default
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    let raw = std::env::var(name).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
