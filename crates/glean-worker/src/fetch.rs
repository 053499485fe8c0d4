//! Document fetching

use crate::config::{WorkerConfig, DEFAULT_MAX_DOCUMENT_BYTES};
use crate::error::FetchError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Source of raw documents for extraction
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Retrieve the raw bytes of the document at `url`
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

#[async_trait]
impl<T: DocumentFetcher + ?Sized> DocumentFetcher for &T {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(url).await
    }
}

/// HTTP fetcher
///
/// With an endpoint configured, documents are requested through it as
/// `GET {endpoint}?url={url}` (for a rendering proxy); otherwise the URL is
/// fetched directly. Bodies larger than the size cap are rejected without
/// being buffered in full.
pub struct HttpFetcher {
    client: reqwest::Client,
    endpoint: Option<String>,
    max_document_bytes: u64,
}

impl HttpFetcher {
    /// Create a fetcher with the given endpoint and request timeout
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        })
    }

    /// Set the largest accepted document body
    pub fn with_max_document_bytes(mut self, limit: u64) -> Self {
        self.max_document_bytes = limit;
        self
    }

    /// Create a fetcher from worker configuration
    pub fn from_config(config: &WorkerConfig) -> Result<Self, FetchError> {
        Ok(Self::new(config.fetch_endpoint.clone(), config.fetch_timeout())?
            .with_max_document_bytes(config.max_document_bytes))
    }

    /// Endpoint documents are requested through, if any
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let request = match &self.endpoint {
            Some(endpoint) => self.client.get(endpoint).query(&[("url", url)]),
            None => self.client.get(url),
        };
        let request_error = |source: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let too_large = || FetchError::TooLarge {
            url: url.to_string(),
            limit: self.max_document_bytes,
        };

        let mut response = request.send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_document_bytes)
        {
            return Err(too_large());
        }

        // Content-Length may be absent or wrong, so count as the body arrives
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(request_error)? {
            if (body.len() + chunk.len()) as u64 > self.max_document_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

/// In-memory fetcher serving fixed documents
///
/// Unknown URLs answer `404`.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    documents: HashMap<String, Vec<u8>>,
}

impl StaticFetcher {
    /// Create an empty fetcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`
    pub fn with_document(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(url.into(), body.into());
        self
    }
}

#[async_trait]
impl DocumentFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer a single HTTP request with `response`, returning the URL to hit
    async fn serve_once(response: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let _ = socket.write_all(&response).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{}/", addr)
    }

    fn fetcher(limit: u64) -> HttpFetcher {
        HttpFetcher::new(None, Duration::from_secs(5))
            .unwrap()
            .with_max_document_bytes(limit)
    }

    #[tokio::test]
    async fn test_static_fetcher() {
        let fetcher = StaticFetcher::new().with_document("http://a.test/", "<h1>A</h1>");
        assert_eq!(fetcher.fetch("http://a.test/").await.unwrap(), b"<h1>A</h1>");
        assert!(matches!(
            fetcher.fetch("http://b.test/").await,
            Err(FetchError::Status { status: 404, .. })
        ));
    }

    #[test]
    fn test_http_fetcher_from_config() {
        let config = WorkerConfig {
            fetch_endpoint: Some("http://localhost:8092/new".to_string()),
            ..Default::default()
        };
        let fetcher = HttpFetcher::from_config(&config).unwrap();
        assert_eq!(fetcher.endpoint(), Some("http://localhost:8092/new"));
    }

    #[tokio::test]
    async fn test_body_within_limit_is_returned() {
        let body = "<h1>Widget</h1>";
        let url = serve_once(
            format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{}", body.len(), body)
                .into_bytes(),
        )
        .await;
        assert_eq!(fetcher(64).fetch(&url).await.unwrap(), body.as_bytes());
    }

    #[tokio::test]
    async fn test_declared_length_over_limit_is_rejected() {
        let body = "x".repeat(32);
        let url = serve_once(
            format!("HTTP/1.1 200 OK\r\nContent-Length: 32\r\n\r\n{}", body).into_bytes(),
        )
        .await;
        assert!(matches!(
            fetcher(16).fetch(&url).await,
            Err(FetchError::TooLarge { limit: 16, .. })
        ));
    }

    #[tokio::test]
    async fn test_undeclared_length_over_limit_is_rejected() {
        let body = "x".repeat(32);
        let url = serve_once(
            format!("HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n{}", body).into_bytes(),
        )
        .await;
        assert!(matches!(
            fetcher(16).fetch(&url).await,
            Err(FetchError::TooLarge { limit: 16, .. })
        ));
    }

    #[tokio::test]
    async fn test_http_fetcher_connection_failure() {
        // Nothing listens on port 9 of the loopback interface
        let fetcher = HttpFetcher::new(None, Duration::from_secs(2)).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
    }
}
