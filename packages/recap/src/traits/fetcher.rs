//! Fetcher trait - the HTTP seam used by the video and site extractors.

use async_trait::async_trait;

use crate::error::{FetchError, FetchResult};

/// A completed HTTP exchange.
///
/// Non-success statuses are returned here rather than as errors so callers
/// can treat, say, a missing sitemap as "absent" instead of fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body of a successful response, or a status error.
    pub fn into_body(self) -> FetchResult<String> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(FetchError::Status {
                url: self.url,
                status: self.status,
            })
        }
    }
}

/// Minimal HTTP client surface.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a URL, returning whatever status the server answered with.
    async fn get(&self, url: &str) -> FetchResult<HttpResponse>;

    /// POST a JSON body.
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> FetchResult<HttpResponse>;

    /// GET and require a success status.
    async fn get_text(&self, url: &str) -> FetchResult<String> {
        self.get(url).await?.into_body()
    }

    /// Get the fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
