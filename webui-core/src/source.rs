//! Where payloads come from
//!
//! [`StateSource`] yields the master's state as raw text so the normalizer can
//! compare it byte for byte before parsing. [`JsonFetcher`] is the generic
//! "GET some JSON" capability used by the per-slave views.

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("unreadable body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Used by non-HTTP sources (mocks, files).
    #[error("{0}")]
    Unavailable(String),
}

pub trait StateSource: Send + Sync {
    /// Fetches the current state as opaque text.
    fn fetch(&self) -> impl Future<Output = Result<String, FetchError>> + Send;

    /// Human readable origin, for logs.
    fn describe(&self) -> String;
}

pub trait JsonFetcher: Send + Sync {
    fn fetch_json<T>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> impl Future<Output = Result<T, FetchError>> + Send
    where
        T: DeserializeOwned + Send;
}

fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("webui-core/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// GETs `<base>/<state_path>` from a master.
#[derive(Clone)]
pub struct HttpStateSource {
    client: Client,
    url: Url,
}

impl HttpStateSource {
    pub fn new(base: &str, state_path: &str, timeout: Duration) -> Result<Self, FetchError> {
        let url = state_url(base, state_path)?;
        Ok(Self { client: build_client(timeout), url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

fn state_url(base: &str, state_path: &str) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl { url: base.to_string(), reason };
    let mut base = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(state_path.trim_start_matches('/'))
        .map_err(|e| invalid(e.to_string()))
}

impl StateSource for HttpStateSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        let url = self.url.to_string();
        debug!("GET {}", url);
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request { url: url.clone(), source })?;

        if !response.status().is_success() {
            return Err(FetchError::Status { url, status: response.status().as_u16() });
        }
        response.text().await.map_err(|source| FetchError::Body { url, source })
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

#[derive(Clone)]
pub struct HttpJsonFetcher {
    client: Client,
}

impl HttpJsonFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { client: build_client(timeout) }
    }
}

impl JsonFetcher for HttpJsonFetcher {
    async fn fetch_json<T>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, FetchError>
    where
        T: DeserializeOwned + Send,
    {
        let parsed = if query.is_empty() {
            Url::parse(url)
        } else {
            Url::parse_with_params(url, query)
        }
        .map_err(|e| FetchError::InvalidUrl { url: url.to_string(), reason: e.to_string() })?;
        debug!("GET {}", parsed);
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| FetchError::Request { url: url.to_string(), source })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|source| FetchError::Body { url: url.to_string(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_url_joins_relative_path() {
        let url = state_url("http://localhost:5050", "master/state.json").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5050/master/state.json");

        let url = state_url("http://10.0.0.1:5050/ui", "/master/state.json").unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.1:5050/ui/master/state.json");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpStateSource::new("not a url", "master/state.json", Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_master_is_a_fetch_error() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let source =
            HttpStateSource::new("http://127.0.0.1:9", "master/state.json", Duration::from_millis(500))
                .unwrap();
        assert!(source.fetch().await.is_err());
    }
}
