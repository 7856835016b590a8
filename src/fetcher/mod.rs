//! Log fetchers
//!
//! [`LogSource`] is the seam between the download loop and the remote logs
//! API. [`http::LogsHttpClient`] is the production implementation; tests
//! substitute in-memory sources.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use std::collections::BTreeMap;
use std::pin::Pin;

use crate::downloader::window::Window;

pub mod http;

pub use http::LogsHttpClient;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Request could not be constructed (bad URL, invalid header value)
    #[error("failed to create request: {0}")]
    InvalidRequest(String),

    /// Transport failure: connect, timeout, or broken body stream
    #[error("network error: {0}")]
    NetworkError(String),

    /// Non-2xx response
    #[error("received non-2xx status code {status} from {url}: {body}")]
    HttpError {
        /// Response status code
        status: u16,
        /// Request URL
        url: String,
        /// Leading part of the response body
        body: String,
    },
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Response body as a stream of chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = FetcherResult<Bytes>> + Send>>;

/// A successful (2xx) response for one window
pub struct LogResponse {
    /// Fully qualified request URL
    pub url: String,
    /// Response headers, each name mapped to all of its values
    pub headers: BTreeMap<String, Vec<String>>,
    /// Raw body, possibly compressed; never decoded
    pub body: ByteStream,
}

impl std::fmt::Debug for LogResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogResponse")
            .field("url", &self.url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Source of log batches
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Issue exactly one request for `window`
    ///
    /// # Errors
    /// Any failure, including a non-2xx status, is returned as an error; the
    /// caller does not retry.
    async fn fetch(&self, window: &Window) -> FetcherResult<LogResponse>;

    /// Base URL requests are made against
    fn base_url(&self) -> &str;
}
