//! Page fetching: one bounded outbound request per call.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::Error;

/// Single attempt, no retries: flakiness is surfaced, not masked, since this
/// is a one-shot generation tool.
const FETCH_TIMEOUT: Duration = Duration::from_secs(25);

/// Retrieves raw page content for a URL.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "Mozilla/5.0 (compatible; schemaforge/{})",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|source| Error::Fetch {
                url: String::new(),
                source,
            })?;
        Ok(Fetcher { client })
    }

    /// Fetch the body of `url`.
    ///
    /// Fails with [`Error::InvalidUrl`] before any network call when the URL
    /// is malformed or not http(s); with [`Error::Fetch`] on network failure,
    /// timeout, or a non-success status.
    pub async fn fetch(&self, url: &str) -> Result<String, Error> {
        let parsed = validate_url(url)?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| Error::Fetch {
                url: url.to_string(),
                source,
            })?;

        let body = response.text().await.map_err(|source| Error::Fetch {
            url: url.to_string(),
            source,
        })?;

        debug!(url, bytes = body.len(), "fetched page");
        Ok(body)
    }
}

/// Parse and sanity-check a URL without touching the network.
pub fn validate_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url).map_err(|err| Error::InvalidUrl {
        url: url.to_string(),
        reason: err.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(Error::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}

/// Explicit, bounded page cache keyed by URL.
///
/// Caller-supplied, never implicit process state. Oldest entries are evicted
/// first when capacity is reached; `invalidate` and `clear` give the caller
/// an explicit invalidation policy.
#[derive(Debug)]
pub struct PageCache {
    capacity: usize,
    entries: HashMap<String, String>,
    order: VecDeque<String>,
}

impl PageCache {
    pub fn new(capacity: usize) -> Self {
        PageCache {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn get(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(String::as_str)
    }

    pub fn insert(&mut self, url: &str, body: String) {
        if self.entries.insert(url.to_string(), body).is_none() {
            self.order.push_back(url.to_string());
            while self.entries.len() > self.capacity {
                if let Some(oldest) = self.order.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
        }
    }

    pub fn invalidate(&mut self, url: &str) {
        self.entries.remove(url);
        self.order.retain(|entry| entry != url);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_url_without_network() {
        let err = validate_url("not a url").unwrap_err();
        assert_eq!(err.kind(), "invalid-url");
    }

    #[test]
    fn rejects_non_http_schemes() {
        let err = validate_url("ftp://example.com/file").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { ref reason, .. } if reason.contains("ftp")));
    }

    #[test]
    fn accepts_http_and_https() {
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("https://example.com/page?x=1").is_ok());
    }

    #[test]
    fn cache_evicts_oldest_at_capacity() {
        let mut cache = PageCache::new(2);
        cache.insert("a", "one".to_string());
        cache.insert("b", "two".to_string());
        cache.insert("c", "three".to_string());

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b"), Some("two"));
        assert_eq!(cache.get("c"), Some("three"));
    }

    #[test]
    fn cache_overwrite_does_not_grow() {
        let mut cache = PageCache::new(2);
        cache.insert("a", "one".to_string());
        cache.insert("a", "uno".to_string());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a"), Some("uno"));
    }

    #[test]
    fn cache_invalidation_is_explicit() {
        let mut cache = PageCache::new(4);
        cache.insert("a", "one".to_string());
        cache.insert("b", "two".to_string());

        cache.invalidate("a");
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b"), Some("two"));

        cache.clear();
        assert!(cache.is_empty());
    }
}
