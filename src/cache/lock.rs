//! Cross-process lock around writes to one cache entry.
//!
//! On Unix this is an advisory `flock(2)` on a file under `<root>/.locks`.
//! Elsewhere acquisition is a no-op and writers rely on atomic renames alone.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// Subdirectory within the cache root for lock files.
pub(crate) const LOCKS_SUBDIR: &str = ".locks";

/// Holds an exclusive lock until dropped.
#[derive(Debug)]
pub struct CacheLock {
    _file: File,
}

impl CacheLock {
    /// Blocks until the exclusive lock called `name` is held.
    #[cfg(unix)]
    pub fn acquire_exclusive(cache_root: &Path, name: &str) -> io::Result<Self> {
        let file = open_lock_file(cache_root, name)?;

        // SAFETY: the descriptor comes from `file`, which is owned by this
        // scope and stays open for the duration of the call.
        let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
        if result != 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self { _file: file })
    }

    #[cfg(not(unix))]
    pub fn acquire_exclusive(cache_root: &Path, name: &str) -> io::Result<Self> {
        Ok(Self {
            _file: open_lock_file(cache_root, name)?,
        })
    }
}

fn open_lock_file(cache_root: &Path, name: &str) -> io::Result<File> {
    let locks_dir = cache_root.join(LOCKS_SUBDIR);
    std::fs::create_dir_all(&locks_dir)?;

    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(locks_dir.join(format!("{name}.lock")))
}
