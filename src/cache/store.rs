//! On-disk driver cache keyed by browser type, platform and version.

use super::lock::{CacheLock, LOCKS_SUBDIR};
use crate::drivers::BrowserType;
use crate::error::{DriverError, Result};
use crate::platform::Platform;
use crate::version::DriverVersion;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const LOG_TARGET: &str = "webdriver_cache::cache";

/// Written last, after the binary is in place. No manifest means no entry.
const MANIFEST_NAME: &str = ".entry.json";

/// Prefix of in-flight files; they are never looked up.
const STAGING_PREFIX: &str = ".staging-";

/// Identifies exactly one cached driver binary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    browser: BrowserType,
    platform: Platform,
    version: DriverVersion,
}

impl CacheKey {
    pub fn new(browser: BrowserType, platform: Platform, version: DriverVersion) -> Self {
        Self {
            browser,
            platform,
            version,
        }
    }

    pub fn browser(&self) -> BrowserType {
        self.browser
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn version(&self) -> &DriverVersion {
        &self.version
    }

    /// `<browser>/<platform>/<version>`, relative to the cache root.
    pub fn relative_dir(&self) -> PathBuf {
        Path::new(self.browser.name())
            .join(self.platform.token())
            .join(self.version.as_str())
    }

    pub fn executable_name(&self) -> String {
        self.platform.executable_name(self.browser.driver_name())
    }

    fn lock_name(&self) -> String {
        format!("{}-{}-{}", self.browser.name(), self.platform.token(), self.version)
    }
}

/// A complete, validated cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    /// Absolute path of the executable.
    pub path: PathBuf,
    pub size: u64,
    /// Seconds since the Unix epoch.
    pub created_at: u64,
}

/// Directory-backed cache.
///
/// Layout: `<root>/<browser>/<platform>/<version>/<executable>` plus a
/// manifest next to the executable. Files are staged inside the entry
/// directory and renamed into place, so readers only ever see complete files.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.relative_dir())
    }

    pub fn binary_path(&self, key: &CacheKey) -> PathBuf {
        self.entry_dir(key).join(key.executable_name())
    }

    fn manifest_path(&self, key: &CacheKey) -> PathBuf {
        self.entry_dir(key).join(MANIFEST_NAME)
    }

    /// Returns the entry for `key` if it is complete: manifest present and
    /// matching, binary present with the recorded size and executable.
    pub fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        let manifest_path = self.manifest_path(key);
        let manifest = match fs::read(&manifest_path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(target: LOG_TARGET, key = %key.lock_name(), error = %err, "cache miss");
                return None;
            }
        };

        let recorded: CacheEntry = match serde_json::from_slice(&manifest) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(
                    target: LOG_TARGET,
                    path = %manifest_path.display(),
                    error = %err,
                    "ignoring unreadable cache manifest"
                );
                return None;
            }
        };
        if recorded.key != *key {
            debug!(target: LOG_TARGET, key = %key.lock_name(), "cache manifest belongs to another key");
            return None;
        }

        let binary = self.binary_path(key);
        let complete = fs::metadata(&binary)
            .map(|meta| meta.is_file() && meta.len() == recorded.size && is_executable(&meta))
            .unwrap_or(false);
        if !complete {
            debug!(
                target: LOG_TARGET,
                key = %key.lock_name(),
                path = %binary.display(),
                "cache miss, binary incomplete"
            );
            return None;
        }

        let path = dunce::canonicalize(&binary).unwrap_or(binary);
        debug!(target: LOG_TARGET, key = %key.lock_name(), path = %path.display(), "cache hit");
        Some(CacheEntry { path, ..recorded })
    }

    /// Stores `binary` under `key` and returns the new entry.
    ///
    /// Holds the key's exclusive lock for the duration. If another writer
    /// completed the entry first, that entry is returned untouched.
    pub fn store(&self, key: &CacheKey, binary: &[u8]) -> Result<CacheEntry> {
        let dir = self.entry_dir(key);
        fs::create_dir_all(&dir).map_err(|e| DriverError::cache_write(&dir, e))?;

        let _lock = CacheLock::acquire_exclusive(&self.root, &key.lock_name())
            .map_err(|e| DriverError::cache_write(self.root.join(LOCKS_SUBDIR), e))?;

        if let Some(existing) = self.lookup(key) {
            debug!(target: LOG_TARGET, key = %key.lock_name(), "entry completed by another writer");
            return Ok(existing);
        }

        let binary_path = self.binary_path(key);
        write_atomically(&dir, &binary_path, binary, true)?;
        let path = dunce::canonicalize(&binary_path).map_err(|e| DriverError::cache_write(&binary_path, e))?;

        let entry = CacheEntry {
            key: key.clone(),
            path,
            size: binary.len() as u64,
            created_at: unix_now(),
        };
        let manifest_path = self.manifest_path(key);
        let manifest = serde_json::to_vec_pretty(&entry)
            .map_err(|e| DriverError::cache_write(&manifest_path, io::Error::other(e)))?;
        write_atomically(&dir, &manifest_path, &manifest, false)?;

        info!(
            target: LOG_TARGET,
            key = %key.lock_name(),
            path = %entry.path.display(),
            size = entry.size,
            "driver stored in cache"
        );
        Ok(entry)
    }

    /// Every complete entry under the root.
    pub fn entries(&self) -> Vec<CacheEntry> {
        let mut entries: Vec<CacheEntry> = WalkDir::new(&self.root)
            .min_depth(4)
            .max_depth(4)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name() == MANIFEST_NAME)
            .filter_map(|entry| fs::read(entry.path()).ok())
            .filter_map(|bytes| serde_json::from_slice::<CacheEntry>(&bytes).ok())
            .filter_map(|recorded| self.lookup(&recorded.key))
            .collect();

        entries.sort_by(|a, b| {
            (a.key.browser.name(), a.key.platform.token(), &a.key.version)
                .cmp(&(b.key.browser.name(), b.key.platform.token(), &b.key.version))
        });
        entries
    }

    /// Evicts one entry. Returns whether anything was removed.
    pub fn remove(&self, key: &CacheKey) -> Result<bool> {
        let dir = self.entry_dir(key);
        if !dir.exists() {
            return Ok(false);
        }

        let _lock = CacheLock::acquire_exclusive(&self.root, &key.lock_name())
            .map_err(|e| DriverError::cache_write(self.root.join(LOCKS_SUBDIR), e))?;

        // Manifest first, so a failure half-way leaves a miss rather than a hit.
        let manifest_path = self.manifest_path(key);
        match fs::remove_file(&manifest_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(DriverError::cache_write(manifest_path, e)),
        }
        fs::remove_dir_all(&dir).map_err(|e| DriverError::cache_write(&dir, e))?;

        info!(target: LOG_TARGET, key = %key.lock_name(), "cache entry removed");
        Ok(true)
    }

    /// Deletes the whole cache root.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {
                info!(target: LOG_TARGET, root = %self.root.display(), "cache cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DriverError::cache_write(&self.root, e)),
        }
    }
}

/// Writes `contents` to a staging file in `dir`, then renames it onto `dest`.
fn write_atomically(dir: &Path, dest: &Path, contents: &[u8], executable: bool) -> Result<()> {
    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(dir)
        .map_err(|e| DriverError::cache_write(dir, e))?;

    staged
        .write_all(contents)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| DriverError::cache_write(staged.path(), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = if executable { 0o755 } else { 0o644 };
        staged
            .as_file()
            .set_permissions(fs::Permissions::from_mode(mode))
            .map_err(|e| DriverError::cache_write(staged.path(), e))?;
    }
    #[cfg(not(unix))]
    let _ = executable;

    staged
        .persist(dest)
        .map_err(|e| DriverError::cache_write(dest, e.error))?;
    Ok(())
}

#[cfg(unix)]
fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &fs::Metadata) -> bool {
    true
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
