//! Resolves, downloads and caches browser driver binaries.
//!
//! [`DriverManager::install`] turns a (browser type, platform, version)
//! request into the absolute path of a cached executable, downloading it at
//! most once per cache key.

// Top-level public modules
pub mod archive;
pub mod cache;
pub mod config;
pub mod drivers;
pub mod error;
pub mod manager;
pub mod platform;
pub mod resolver;
pub mod transport;
pub mod version;

pub use cache::{CacheEntry, CacheKey, CacheStore};
pub use config::ManagerConfig;
pub use drivers::{BrowserType, DriverSource};
pub use error::{DriverError, DriverErrorKind, Result};
pub use manager::DriverManager;
pub use platform::Platform;
pub use transport::HttpTransport;
pub use version::{DriverVersion, VersionRequest};

use async_trait::async_trait;
use bytes::Bytes;

/// Fetches remote resources for the manager.
///
/// One call is one attempt: implementations do not retry.
#[async_trait]
pub trait Transport: Send + Sync {

    /// Performs a GET on `url` and returns the whole body.
    /// Non-success statuses are reported as [`DriverError::Download`] with the
    /// status code set.
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}
