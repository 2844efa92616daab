//! Content-addressed cache of driver binaries.
//!
//! One directory per (browser type, platform, version) under a configurable
//! root. Entries become visible atomically and concurrent writers for the same
//! key are serialised by a file lock, so separate processes can share a root.

mod lock;
mod store;

pub use lock::CacheLock;
pub use store::{CacheEntry, CacheKey, CacheStore};
