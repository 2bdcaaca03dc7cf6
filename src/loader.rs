//! Background image resolution
//!
//! Resolves image URLs through the cache on tokio tasks and reports results to
//! the main application over a channel, so the UI never blocks on downloads.

use tokio::sync::mpsc;
use tracing::warn;

use crate::cache::{CacheStats, ImageCache};

/// Messages sent from background tasks to the main app
#[derive(Debug, Clone, PartialEq)]
pub enum LoadMessage {
    /// A URL was resolved to a local path or fell back to itself
    Resolved { index: usize, source: String },
    /// Every URL from the initial batch has been resolved
    Completed,
    /// Cache folder was cleared; carries the removed file count or an error
    Cleared(Result<usize, String>),
    /// Fresh cache statistics
    Stats(CacheStats),
}

/// Handle for starting background work and receiving its results
pub struct LoadHandle {
    /// Channel for receiving load messages
    pub receiver: mpsc::Receiver<LoadMessage>,
    sender: mpsc::Sender<LoadMessage>,
    cache: ImageCache,
}

impl LoadHandle {
    /// Creates a LoadHandle and starts resolving `urls` in the background
    ///
    /// Each URL gets its own task; results arrive as
    /// [`LoadMessage::Resolved`] in completion order, followed by a single
    /// [`LoadMessage::Completed`].
    pub fn spawn(cache: ImageCache, urls: Vec<String>) -> Self {
        let (sender, receiver) = mpsc::channel(64);

        let tx = sender.clone();
        let batch_cache = cache.clone();
        tokio::spawn(async move {
            let tasks = urls.into_iter().enumerate().map(|(index, url)| {
                let cache = batch_cache.clone();
                let tx = tx.clone();
                async move {
                    let source = cache.get(&url).await;
                    let _ = tx.send(LoadMessage::Resolved { index, source }).await;
                }
            });
            futures::future::join_all(tasks).await;

            let _ = tx.send(LoadMessage::Completed).await;
            if let Ok(stats) = batch_cache.stats().await {
                let _ = tx.send(LoadMessage::Stats(stats)).await;
            }
        });

        Self {
            receiver,
            sender,
            cache,
        }
    }

    /// Resolves a single URL again (e.g. after the cache was cleared)
    pub fn reload(&self, index: usize, url: String) {
        let cache = self.cache.clone();
        let tx = self.sender.clone();
        tokio::spawn(async move {
            let source = cache.get(&url).await;
            let _ = tx.send(LoadMessage::Resolved { index, source }).await;
            if let Ok(stats) = cache.stats().await {
                let _ = tx.send(LoadMessage::Stats(stats)).await;
            }
        });
    }

    /// Clears the cache folder in the background
    pub fn clear(&self) {
        let cache = self.cache.clone();
        let tx = self.sender.clone();
        tokio::spawn(async move {
            let result = cache.clear().await.map_err(|e| {
                warn!(error = %e, "Failed to clear image cache");
                e.to_string()
            });
            let _ = tx.send(LoadMessage::Cleared(result)).await;
            if let Ok(stats) = cache.stats().await {
                let _ = tx.send(LoadMessage::Stats(stats)).await;
            }
        });
    }

    /// Requests fresh cache statistics
    pub fn refresh_stats(&self) {
        let cache = self.cache.clone();
        let tx = self.sender.clone();
        tokio::spawn(async move {
            match cache.stats().await {
                Ok(stats) => {
                    let _ = tx.send(LoadMessage::Stats(stats)).await;
                }
                Err(e) => warn!(error = %e, "Failed to read cache statistics"),
            }
        });
    }
}

/// Checks for pending load messages without blocking
///
/// # Returns
/// * `Some(LoadMessage)` if a message was available
/// * `None` if no messages are pending
pub fn try_recv(handle: &mut LoadHandle) -> Option<LoadMessage> {
    handle.receiver.try_recv().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::is_local_source;
    use crate::fetcher::{FetchError, ImageFetcher};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct StaticFetcher;

    #[async_trait]
    impl ImageFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
            Ok(b"image".to_vec())
        }
    }

    fn test_cache(temp_dir: &TempDir) -> ImageCache {
        ImageCache::with_fetcher(
            temp_dir.path().join("images"),
            "example.com",
            Arc::new(StaticFetcher),
        )
    }

    /// Receives messages until `Completed`, returning the resolved ones
    async fn collect_until_completed(handle: &mut LoadHandle) -> Vec<(usize, String)> {
        let mut resolved = Vec::new();
        while let Some(msg) = handle.receiver.recv().await {
            match msg {
                LoadMessage::Resolved { index, source } => resolved.push((index, source)),
                LoadMessage::Completed => break,
                _ => {}
            }
        }
        resolved.sort();
        resolved
    }

    #[tokio::test]
    async fn test_spawn_resolves_every_url() {
        let temp_dir = TempDir::new().unwrap();
        let urls = vec![
            "https://img.example.com/a.png".to_string(),
            "https://other.net/b.png".to_string(),
        ];

        let mut handle = LoadHandle::spawn(test_cache(&temp_dir), urls);
        let resolved = collect_until_completed(&mut handle).await;

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].0, 0);
        assert!(is_local_source(&resolved[0].1));
        assert_eq!(resolved[1], (1, "https://other.net/b.png".to_string()));
    }

    #[tokio::test]
    async fn test_spawn_with_no_urls_completes() {
        let temp_dir = TempDir::new().unwrap();

        let mut handle = LoadHandle::spawn(test_cache(&temp_dir), Vec::new());

        assert_eq!(handle.receiver.recv().await, Some(LoadMessage::Completed));
    }

    #[tokio::test]
    async fn test_clear_reports_removed_count() {
        let temp_dir = TempDir::new().unwrap();
        let mut handle = LoadHandle::spawn(
            test_cache(&temp_dir),
            vec!["https://img.example.com/a.png".to_string()],
        );
        collect_until_completed(&mut handle).await;

        handle.clear();

        loop {
            match handle.receiver.recv().await {
                Some(LoadMessage::Cleared(result)) => {
                    assert_eq!(result, Ok(1));
                    break;
                }
                Some(_) => continue,
                None => panic!("channel closed before Cleared"),
            }
        }
    }

    #[tokio::test]
    async fn test_reload_sends_resolved() {
        let temp_dir = TempDir::new().unwrap();
        let mut handle = LoadHandle::spawn(test_cache(&temp_dir), Vec::new());
        collect_until_completed(&mut handle).await;

        handle.reload(3, "https://img.example.com/c.png".to_string());

        loop {
            match handle.receiver.recv().await {
                Some(LoadMessage::Resolved { index, source }) => {
                    assert_eq!(index, 3);
                    assert!(is_local_source(&source));
                    break;
                }
                Some(_) => continue,
                None => panic!("channel closed before Resolved"),
            }
        }
    }

    #[tokio::test]
    async fn test_refresh_stats_sends_stats() {
        let temp_dir = TempDir::new().unwrap();
        let images = temp_dir.path().join("images");
        std::fs::create_dir_all(&images).unwrap();
        std::fs::write(images.join("a.png"), b"1234").unwrap();
        let mut handle = LoadHandle::spawn(test_cache(&temp_dir), Vec::new());
        collect_until_completed(&mut handle).await;

        handle.refresh_stats();

        loop {
            match handle.receiver.recv().await {
                Some(LoadMessage::Stats(stats)) if stats.entries == 1 => {
                    assert_eq!(stats.total_size, 4);
                    break;
                }
                Some(_) => continue,
                None => panic!("channel closed before Stats"),
            }
        }
    }

    #[tokio::test]
    async fn test_try_recv_empty_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let (_sender, receiver) = mpsc::channel(1);
        let mut handle = LoadHandle {
            receiver,
            sender: mpsc::channel(1).0,
            cache: test_cache(&temp_dir),
        };

        assert!(try_recv(&mut handle).is_none());
    }
}
