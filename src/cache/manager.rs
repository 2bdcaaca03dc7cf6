//! Image cache backed by plain files
//!
//! Provides an `ImageCache` that turns remote image URLs into local `file://`
//! paths, downloading each URL at most once and falling back to the original
//! URL whenever caching is not possible.

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};
use url::Url;

use super::key::{cache_file_name, is_temp_file, temp_file_name};
use crate::config::CacheConfig;
use crate::fetcher::{FetchError, HttpFetcher, ImageFetcher};

/// Scheme prefix of a resolved local source
pub const LOCAL_SCHEME: &str = "file://";

/// Errors from cache maintenance and from inside a fetch attempt
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem operation failed
    #[error("Cache I/O error: {0}")]
    Io(#[from] io::Error),

    /// Download failed
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Summary of the files currently in the cache folder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of completed cache files
    pub entries: usize,
    /// Total size of completed cache files in bytes
    pub total_size: u64,
    /// Modification time of the oldest file
    pub oldest: Option<DateTime<Utc>>,
    /// Modification time of the newest file
    pub newest: Option<DateTime<Utc>>,
}

type PendingFetch = Shared<BoxFuture<'static, String>>;
type InFlightMap = HashMap<String, PendingFetch>;

/// Removes a URL from the in-flight map when the download task ends,
/// including when it panics.
struct InFlightGuard {
    in_flight: Arc<Mutex<InFlightMap>>,
    url: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.url);
    }
}

/// Downloads and stores images on disk, one file per URL
///
/// Cheap to clone; clones share the in-flight map and the fetcher.
#[derive(Clone)]
pub struct ImageCache {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
    /// Substring a URL host must contain to be cached
    allowed_host: String,
    fetcher: Arc<dyn ImageFetcher>,
    in_flight: Arc<Mutex<InFlightMap>>,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("cache_dir", &self.cache_dir)
            .field("allowed_host", &self.allowed_host)
            .field("in_flight", &self.in_flight.lock().len())
            .finish()
    }
}

impl ImageCache {
    /// Creates a cache that downloads over HTTP with the configured timeouts
    pub fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        let fetcher = HttpFetcher::new(config.connect_timeout, config.read_timeout)?;
        Ok(Self::with_fetcher(
            config.cache_dir.clone(),
            config.allowed_host.clone(),
            Arc::new(fetcher),
        ))
    }

    /// Creates a cache with a custom directory and fetcher
    ///
    /// Useful for testing or when images come from somewhere other than HTTP.
    pub fn with_fetcher(
        cache_dir: PathBuf,
        allowed_host: impl Into<String>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        Self {
            cache_dir,
            allowed_host: allowed_host.into(),
            fetcher,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the cache folder
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the host whitelist substring
    pub fn allowed_host(&self) -> &str {
        &self.allowed_host
    }

    /// Number of downloads currently outstanding
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Resolves a URL to something directly renderable.
    ///
    /// Returns `file://<path>` once the image is on disk, or the original URL
    /// when it is empty, not whitelisted, or could not be downloaded. Never
    /// fails: every error is logged and degrades to the original URL.
    ///
    /// Concurrent calls for the same URL share a single download.
    pub async fn get(&self, url: &str) -> String {
        if url.is_empty() {
            return String::new();
        }

        let pending = {
            let mut in_flight = self.in_flight.lock();
            match in_flight.get(url) {
                Some(existing) => {
                    debug!(url = %url, "Joining in-flight download");
                    existing.clone()
                }
                None => {
                    let pending = self.spawn_resolve(url);
                    in_flight.insert(url.to_string(), pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Starts the resolve on its own task so it runs to completion even if
    /// every caller goes away. Must be called with the in-flight lock held.
    fn spawn_resolve(&self, url: &str) -> PendingFetch {
        let cache = self.clone();
        let key = url.to_string();
        let task = tokio::spawn(async move {
            let _guard = InFlightGuard {
                in_flight: Arc::clone(&cache.in_flight),
                url: key.clone(),
            };
            cache.resolve(&key).await
        });

        let fallback = url.to_string();
        async move {
            match task.await {
                Ok(source) => source,
                Err(e) => {
                    warn!(url = %fallback, error = %e, "Image download task failed");
                    fallback
                }
            }
        }
        .boxed()
        .shared()
    }

    async fn resolve(&self, url: &str) -> String {
        match self.try_resolve(url).await {
            Ok(source) => source,
            Err(e) => {
                warn!(url = %url, error = %e, "Falling back to remote image");
                url.to_string()
            }
        }
    }

    async fn try_resolve(&self, url: &str) -> Result<String, CacheError> {
        let Some(path) = self.local_path(url) else {
            debug!(url = %url, allowed_host = %self.allowed_host, "Host not whitelisted, not caching");
            return Ok(url.to_string());
        };

        if fs::try_exists(&path).await? {
            debug!(url = %url, path = ?path, "Cache hit");
            return Ok(local_source(&path));
        }

        let data = self.fetcher.fetch(url).await?;
        self.persist(&path, &data).await?;

        info!(url = %url, path = ?path, size = data.len(), "Cached image");
        Ok(local_source(&path))
    }

    /// Returns the cache path for a whitelisted URL, or `None` when the URL
    /// cannot be parsed or its host does not match.
    fn local_path(&self, url: &str) -> Option<PathBuf> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?;
        if !host.contains(self.allowed_host.as_str()) {
            return None;
        }
        Some(self.cache_dir.join(cache_file_name(&parsed)))
    }

    /// Writes `data` next to `path` and renames it into place, so readers only
    /// ever see a complete file under the final name.
    async fn persist(&self, path: &Path, data: &[u8]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir).await?;

        let temp_path = temp_path_for(path);

        if let Err(e) = fs::write(&temp_path, data).await {
            warn!(path = ?temp_path, error = %e, "Failed to write temporary cache file");
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, path).await {
            warn!(from = ?temp_path, to = ?path, error = %e, "Failed to rename temporary cache file");
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    /// Returns the cached file for a URL without downloading anything
    pub async fn cached_path(&self, url: &str) -> Option<PathBuf> {
        let path = self.local_path(url)?;
        match fs::try_exists(&path).await {
            Ok(true) => Some(path),
            _ => None,
        }
    }

    /// Deletes every file in the cache folder and returns how many were removed
    pub async fn clear(&self) -> Result<usize, CacheError> {
        let mut entries = match fs::read_dir(&self.cache_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        info!(dir = ?self.cache_dir, removed, "Cleared image cache");
        Ok(removed)
    }

    /// Collects statistics about completed cache files
    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        let mut stats = CacheStats::default();

        let mut entries = match fs::read_dir(&self.cache_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(stats),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if is_temp_file(&entry.file_name().to_string_lossy()) {
                continue;
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            stats.entries += 1;
            stats.total_size += metadata.len();

            if let Ok(modified) = metadata.modified() {
                let modified: DateTime<Utc> = modified.into();
                stats.oldest = Some(stats.oldest.map_or(modified, |t| t.min(modified)));
                stats.newest = Some(stats.newest.map_or(modified, |t| t.max(modified)));
            }
        }

        Ok(stats)
    }
}

/// Whether a resolved source points at a local cache file
pub fn is_local_source(source: &str) -> bool {
    source.starts_with(LOCAL_SCHEME)
}

fn local_source(path: &Path) -> String {
    format!("{}{}", LOCAL_SCHEME, path.display())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(temp_file_name(&name))
}
