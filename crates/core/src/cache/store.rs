//! Filesystem-backed cache store.
//!
//! Records live at `<root>/<service>/<2 hex>/<30 hex>`. The file's modification time is the
//! entry timestamp: a read older than the TTL deletes the file and reports a miss. Nothing
//! sweeps the tree in the background.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::hash::CacheKey;
use crate::error::StoreError;

/// Default entry lifetime (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Sharded, TTL-bound file store.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
    default_ttl: Duration,
}

impl CacheStore {
    /// Create a store rooted at `root`. Directories are created lazily on write.
    pub fn new(root: impl Into<PathBuf>, default_ttl: Duration) -> Self {
        Self { root: root.into(), default_ttl }
    }

    /// Absolute path of the record for `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(CacheKey::parse(key)?.relative_path()))
    }

    /// Read a record if present and younger than `ttl` (the store default when `None`).
    ///
    /// Missing files are a silent miss. Expired files are removed. Any other failure is
    /// logged and also reported as a miss.
    pub async fn read(&self, key: &str, ttl: Option<Duration>) -> Option<Vec<u8>> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        match self.try_read(key, ttl).await {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(key, error = %e, "cache read failed");
                None
            }
        }
    }

    async fn try_read(&self, key: &str, ttl: Duration) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let age = metadata.modified()?.elapsed().unwrap_or_default();
        if age > ttl {
            tracing::debug!(key, ?age, ?ttl, "cache entry expired");
            remove_if_exists(&path).await?;
            return Ok(None);
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            // removed by a concurrent reader that saw it expire
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a record atomically, replacing any previous content and refreshing its mtime.
    ///
    /// Returns `false` (after logging) when the write failed.
    pub async fn write(&self, key: &str, data: &[u8]) -> bool {
        match self.try_write(key, data).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(key, error = %e, "cache write failed");
                false
            }
        }
    }

    async fn try_write(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let key = CacheKey::parse(key)?;
        let dir = self.root.join(key.shard_dir());
        let path = self.root.join(key.relative_path());

        tokio::fs::create_dir_all(&dir).await?;

        // stage next to the target and rename over it, readers see the old or new record
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || -> io::Result<()> {
            let mut staged = tempfile::NamedTempFile::new_in(&dir)?;
            staged.write_all(&data)?;
            staged.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(io::Error::other)??;
        Ok(())
    }
}

async fn remove_if_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
