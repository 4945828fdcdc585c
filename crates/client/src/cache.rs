//! Durable on-device key-value cache.
//!
//! One JSON file per key under a cache directory. The cache is best-effort
//! by design: a missing, unreadable, or corrupt entry degrades to "empty"
//! with a warning, never to an operation failure. Corrupt entries are
//! evicted on read so they cannot poison later loads.
//!
//! Keys are partitioned per feature (see [`keys`]); the cart entry is
//! written only by reconciliation after a successful remote call, the
//! wishlist entry directly by wishlist actions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Cache keys, one per feature.
pub mod keys {
    /// Serialized cart item list (written by reconciliation).
    pub const CART: &str = "cart";
    /// Serialized wishlist entries (client-authoritative).
    pub const WISHLIST: &str = "wishlist";
    /// Last successfully fetched product catalog (read-path fallback).
    pub const CATALOG: &str = "catalog";
    /// Bearer credential from the last login.
    pub const TOKEN: &str = "token";
}

/// A durable JSON-file key-value store.
#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    /// Open (and create if needed) a cache rooted at `dir`.
    #[must_use]
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!("failed to create cache dir {}: {e}", dir.display());
        }
        Self { dir }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Load a value for `key`, or `None` if absent or unreadable.
    ///
    /// A corrupt entry is removed so the next load starts clean.
    #[must_use]
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.entry_path(key);
        let text = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("evicting corrupt cache entry {key}: {e}");
                remove_entry(&path, key);
                None
            }
        }
    }

    /// Store a value for `key`, best-effort.
    pub fn store<T: Serialize>(&self, key: &str, value: &T) {
        let path = self.entry_path(key);
        match serde_json::to_string(value) {
            Ok(text) => {
                if let Err(e) = fs::write(&path, text) {
                    warn!("failed to write cache entry {key}: {e}");
                }
            }
            Err(e) => warn!("failed to serialize cache entry {key}: {e}"),
        }
    }

    /// Remove the entry for `key`, best-effort.
    pub fn remove(&self, key: &str) {
        remove_entry(&self.entry_path(key), key);
    }
}

fn remove_entry(path: &Path, key: &str) {
    if let Err(e) = fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!("failed to remove cache entry {key}: {e}");
    }
}
