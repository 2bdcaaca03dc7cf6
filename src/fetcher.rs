//! Image download capability
//!
//! The cache never talks to the network directly. It goes through an
//! [`ImageFetcher`], which keeps the download side swappable in tests.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while downloading an image
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with something other than 200 OK
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Something that can download the raw bytes behind a URL
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Downloads `url` and returns the response body.
    ///
    /// Only a `200 OK` response counts as success; every other status is
    /// reported as [`FetchError::Status`].
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`ImageFetcher`] backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with fixed connect and read timeouts
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Creates a fetcher around an existing HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!(url = %url, "Downloading image");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let data = response.bytes().await?.to_vec();
        debug!(url = %url, size = data.len(), "Downloaded image");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single raw HTTP response and returns a URL pointing at it
    async fn serve_once(status_line: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let header = format!(
                "HTTP/1.1 {}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status_line,
                body.len()
            );
            socket.write_all(header.as_bytes()).await.unwrap();
            socket.write_all(body).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}/img/photo.png", addr)
    }

    fn local_fetcher() -> HttpFetcher {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpFetcher::with_client(client)
    }

    #[test]
    fn test_new_builds_client() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1), Duration::from_secs(1));
        assert!(fetcher.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_ok() {
        let url = serve_once("200 OK", b"\x89PNGdata").await;

        let body = local_fetcher().fetch(&url).await.expect("fetch should succeed");

        assert_eq!(body, b"\x89PNGdata".to_vec());
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_ok_status() {
        let url = serve_once("404 Not Found", b"missing").await;

        let err = local_fetcher().fetch(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::Status(404)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_treats_other_success_codes_as_failure() {
        let url = serve_once("204 No Content", b"").await;

        let err = local_fetcher().fetch(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::Status(204)));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_request_error() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = local_fetcher()
            .fetch(&format!("http://{}/a.png", addr))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Request(_)));
    }
}
