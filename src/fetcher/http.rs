//! HTTP client for the Cloudflare logs API
//!
//! One GET per window:
//! `GET <base>?start=<unix>&end=<unix>` with `X-Auth-Email`, `X-Auth-Key`
//! and `Accept-Encoding: gzip`. The client is built without transparent
//! decompression, so the body is handed on exactly as received.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, ACCEPT_ENCODING};
use reqwest::{Client, Url};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

use super::{FetcherError, FetcherResult, LogResponse, LogSource};
use crate::downloader::config::{Credentials, DownloadConfig};
use crate::downloader::window::Window;

/// Header carrying the account email
pub const AUTH_EMAIL_HEADER: &str = "X-Auth-Email";

/// Header carrying the API key
pub const AUTH_KEY_HEADER: &str = "X-Auth-Key";

/// Maximum number of characters of an error body kept in [`FetcherError::HttpError`]
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Bytes read from an error body; enough for [`MAX_ERROR_BODY_CHARS`] UTF-8 characters
const MAX_ERROR_BODY_BYTES: usize = MAX_ERROR_BODY_CHARS * 4;

/// Time allowed to establish a connection
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Logs API client
pub struct LogsHttpClient {
    client: Client,
    base_url: Url,
    credentials: Credentials,
}

impl LogsHttpClient {
    /// Create a client
    ///
    /// # Arguments
    /// * `base_url` - Logs endpoint, e.g. `https://api.cloudflare.com/client/v4/zones/<zone>/logs/received`
    /// * `credentials` - Email and key sent on every request
    /// * `read_timeout` - Longest wait for the next piece of the response.
    ///   Resets on every read, so large bodies that keep flowing are never cut off.
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        read_timeout: Duration,
    ) -> FetcherResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(read_timeout))
            .read_timeout(read_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetcherError::InvalidRequest(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Create a client from a validated configuration
    pub fn from_config(config: &DownloadConfig) -> FetcherResult<Self> {
        Self::new(
            config.base_url.clone(),
            config.credentials.clone(),
            config.request_timeout,
        )
    }

    /// Request URL for a window
    ///
    /// Query pairs are appended, so a base URL with its own query is kept intact.
    pub fn request_url(&self, window: &Window) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("start", &window.start.to_string())
            .append_pair("end", &window.end.to_string());
        url
    }
}

#[async_trait]
impl LogSource for LogsHttpClient {
    async fn fetch(&self, window: &Window) -> FetcherResult<LogResponse> {
        let url = self.request_url(window);

        let request = self
            .client
            .get(url.clone())
            .header(AUTH_EMAIL_HEADER, &self.credentials.email)
            .header(AUTH_KEY_HEADER, &self.credentials.key)
            .header(ACCEPT_ENCODING, "gzip")
            .build()
            .map_err(|e| FetcherError::InvalidRequest(e.to_string()))?;

        debug!(url = %url, "Making GET request");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| FetcherError::NetworkError(format!("Failed to make request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body_prefix(response).await;
            warn!(status = status.as_u16(), url = %url, "Non-2xx response");
            return Err(FetcherError::HttpError {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        let headers = header_multimap(response.headers());
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| FetcherError::NetworkError(format!("Failed to read body: {e}"))));

        Ok(LogResponse {
            url: url.to_string(),
            headers,
            body: Box::pin(body),
        })
    }

    fn base_url(&self) -> &str {
        self.base_url.as_str()
    }
}

/// Leading part of an error body, read only up to the cap
///
/// Read errors end the body early; the status is what gets reported.
async fn error_body_prefix(response: reqwest::Response) -> String {
    let mut stream = response.bytes_stream();
    let mut buf: Vec<u8> = Vec::new();
    while buf.len() < MAX_ERROR_BODY_BYTES {
        match stream.next().await {
            Some(Ok(chunk)) => buf.extend_from_slice(&chunk),
            _ => break,
        }
    }
    buf.truncate(MAX_ERROR_BODY_BYTES);
    String::from_utf8_lossy(&buf)
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect()
}

/// Group header values by name, preserving the order values arrived in
fn header_multimap(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        map.entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    map
}
