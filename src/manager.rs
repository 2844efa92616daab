//! The `install()` entry point tying resolution, download, extraction and
//! caching together.

use crate::archive::extract_executable;
use crate::cache::{CacheEntry, CacheKey, CacheStore};
use crate::config::ManagerConfig;
use crate::drivers::{BrowserType, DriverSource};
use crate::error::Result;
use crate::platform::Platform;
use crate::resolver::VersionResolver;
use crate::transport::HttpTransport;
use crate::version::{DriverVersion, VersionRequest};
use crate::Transport;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const LOG_TARGET: &str = "webdriver_cache::manager";

/// Installs one driver family into a cache.
///
/// ```no_run
/// use webdriver_cache::{BrowserType, DriverManager, Platform};
///
/// # async fn example() -> webdriver_cache::Result<()> {
/// let path = DriverManager::new(BrowserType::Edge)?
///     .with_version("101.0.1210.53")
///     .with_platform(Platform::WIN64)
///     .install()
///     .await?;
/// println!("msedgedriver is at {}", path.display());
/// # Ok(())
/// # }
/// ```
pub struct DriverManager {
    source: DriverSource,
    request: VersionRequest,
    platform: Option<Platform>,
    cache: CacheStore,
    transport: Arc<dyn Transport>,
}

impl DriverManager {
    /// A manager for the latest `browser` driver on the host platform, using
    /// settings from the environment.
    pub fn new(browser: BrowserType) -> Result<Self> {
        Self::with_config(browser, ManagerConfig::from_env())
    }

    pub fn with_config(browser: BrowserType, config: ManagerConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.ssl_verify, config.timeout)?;
        Ok(Self {
            source: DriverSource::for_browser(browser),
            request: VersionRequest::Latest,
            platform: None,
            cache: CacheStore::new(config.cache_root),
            transport: Arc::new(transport),
        })
    }

    /// Requests an exact version, or `"latest"`.
    pub fn with_version(mut self, requested: &str) -> Self {
        self.request = VersionRequest::parse(requested);
        self
    }

    /// Targets `platform` instead of the host.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Uses custom endpoints for this driver family.
    pub fn with_source(mut self, source: DriverSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Installs into `cache` instead of the configured cache root.
    pub fn with_cache(mut self, cache: CacheStore) -> Self {
        self.cache = cache;
        self
    }

    pub fn browser(&self) -> BrowserType {
        self.source.browser()
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// The explicit platform, or the host's.
    pub fn platform(&self) -> Result<Platform> {
        self.platform.map_or_else(Platform::current, Ok)
    }

    pub async fn resolve_version(&self) -> Result<DriverVersion> {
        VersionResolver::new(self.transport.as_ref())
            .resolve(&self.source, &self.request)
            .await
    }

    pub fn download_url(&self, version: &DriverVersion, platform: Platform) -> String {
        self.source.download_url(version, platform)
    }

    /// Returns the absolute path of the driver executable, downloading it only
    /// when the cache has no complete entry for the resolved version.
    pub async fn install(&self) -> Result<PathBuf> {
        Ok(self.install_entry().await?.path)
    }

    /// Like [`DriverManager::install`], returning the full cache entry.
    pub async fn install_entry(&self) -> Result<CacheEntry> {
        let platform = self.platform()?;
        let version = self.resolve_version().await?;
        let key = CacheKey::new(self.browser(), platform, version);

        if let Some(entry) = self.cache.lookup(&key) {
            info!(
                target: LOG_TARGET,
                browser = %key.browser(),
                platform = %platform,
                version = %key.version(),
                path = %entry.path.display(),
                "driver found in cache"
            );
            return Ok(entry);
        }

        let url = self.download_url(key.version(), platform);
        info!(target: LOG_TARGET, url = %url, "downloading driver");
        let archive = self
            .transport
            .fetch(&url)
            .await
            .map_err(|e| e.into_no_such_driver())?;

        let executable = key.executable_name();
        let binary = tokio::task::spawn_blocking(move || extract_executable(&archive, &executable)).await??;

        let cache = self.cache.clone();
        let entry = tokio::task::spawn_blocking(move || cache.store(&key, &binary)).await??;

        info!(target: LOG_TARGET, path = %entry.path.display(), "driver installed");
        Ok(entry)
    }
}
