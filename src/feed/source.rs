use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use thiserror::Error;

use super::parser::parse_feed;
use super::types::RetrievedFeed;
use crate::util::{validate_feed_url, UrlValidationError};

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while retrieving a single feed.
///
/// These never abort a run: the fetcher records them on the feed's result.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The subscription URL is not a fetchable http(s) URL
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request and body download exceeded the configured timeout
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    /// Feed could not be parsed as RSS, Atom or JSON Feed
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Retrieves and parses one feed.
#[async_trait]
pub trait FeedSource {
    /// Fetches `url`, giving up after `timeout`.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<RetrievedFeed, FetchError>;
}

/// [`FeedSource`] backed by HTTP and `feed-rs`.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    /// Builds a source with its own client sending `user_agent`.
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    async fn download(&self, url: url::Url) -> Result<(Vec<u8>, Option<String>), FetchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);

        let bytes = read_limited_bytes(response, MAX_FEED_SIZE).await?;
        Ok((bytes, content_type))
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<RetrievedFeed, FetchError> {
        let url = validate_feed_url(url)?;

        let (bytes, content_type) = tokio::time::timeout(timeout, self.download(url))
            .await
            .map_err(|_| FetchError::Timeout(timeout))??;

        let mut feed = parse_feed(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

        // Parsed fine, but the server didn't claim to serve a feed
        if let Some(content_type) = content_type.filter(|ct| !is_feed_media_type(ct)) {
            feed.bozo = Some(format!("{} is not an XML media type", content_type));
        }

        Ok(feed)
    }
}

/// True for XML media types (`text/xml`, `application/rss+xml`, ...) and JSON Feed.
fn is_feed_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence.ends_with("/xml")
        || essence.ends_with("+xml")
        || essence == "application/json"
        || essence == "application/feed+json"
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Capture Content-Length for completeness check
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
