//! Retrieval of raw structure text
//!
//! The loader only needs "give me the body of this URL as text". The
//! [`TextFetcher`] trait keeps that seam injectable; [`HttpFetcher`] does it
//! over HTTP and [`FileFetcher`] reads local paths.
//!
//! No timeout is applied: a host that never answers leaves the request
//! pending.

use std::future::Future;
use std::pin::Pin;
use std::time::{SystemTime, UNIX_EPOCH};

use url::Url;

use crate::compress::decode_text;
use crate::error::{IoError, IoResult};

/// Query parameter appended by [`cache_busted`]
pub const NOCACHE_PARAM: &str = "molview_nocache";

/// Boxed future for the single-threaded loader
pub type LocalFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Source of raw structure text
pub trait TextFetcher {
    /// Retrieve the body at `url` as text
    ///
    /// A non-success status is an error ([`IoError::Status`]).
    fn fetch_text<'a>(&'a self, url: &'a str) -> LocalFuture<'a, IoResult<String>>;
}

/// Append a cache-busting query parameter to `url`
///
/// Absolute URLs go through the URL parser; relative ones get `?` or `&`
/// depending on whether a query is already present.
pub fn cache_busted(url: &str, stamp: u128) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed
                .query_pairs_mut()
                .append_pair(NOCACHE_PARAM, &stamp.to_string());
            parsed.into()
        }
        Err(_) => {
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{}{}{}={}", url, separator, NOCACHE_PARAM, stamp)
        }
    }
}

/// Milliseconds since the Unix epoch, used as cache-busting stamp
pub fn now_stamp() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Fetcher over HTTP(S)
#[cfg(feature = "fetch")]
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

/// User-Agent header for HTTP requests
#[cfg(feature = "fetch")]
const USER_AGENT: &str = concat!("molview-rs/", env!("CARGO_PKG_VERSION"));

#[cfg(feature = "fetch")]
impl HttpFetcher {
    /// Create a fetcher with a fresh client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher sharing an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        HttpFetcher { client }
    }

    async fn get(&self, url: &str) -> IoResult<String> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| IoError::fetch(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IoError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| IoError::fetch(format!("Failed to read response: {}", e)))?;

        decode_text(&body)
    }
}

#[cfg(feature = "fetch")]
impl TextFetcher for HttpFetcher {
    fn fetch_text<'a>(&'a self, url: &'a str) -> LocalFuture<'a, IoResult<String>> {
        Box::pin(self.get(url))
    }
}

/// Fetcher for local files
///
/// Accepts plain paths and `file://` URLs. Query strings and fragments
/// (such as the cache-busting parameter) are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl FileFetcher {
    /// Map a URL-ish string to a filesystem path
    pub fn local_path(url: &str) -> String {
        let path = url.strip_prefix("file://").unwrap_or(url);
        path.split(['?', '#']).next().unwrap_or_default().to_string()
    }
}

impl TextFetcher for FileFetcher {
    fn fetch_text<'a>(&'a self, url: &'a str) -> LocalFuture<'a, IoResult<String>> {
        Box::pin(async move {
            let bytes = tokio::fs::read(Self::local_path(url)).await?;
            decode_text(&bytes)
        })
    }
}
