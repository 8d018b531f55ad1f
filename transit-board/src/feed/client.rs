//! HTTP fetcher for upstream feeds.
//!
//! One request per call, a fixed client-wide timeout, no retries and no
//! caching. Anything other than a 2xx response is a [`TransportError`].

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::config::FeedConfig;

use super::error::TransportError;

/// HTTP method of a feed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    /// Form-encoded POST.
    Post,
}

/// Everything needed to fetch one station's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub url: String,
    pub method: Method,
    /// Extra headers, overriding client defaults.
    pub headers: Vec<(String, String)>,
    /// Form fields for [`Method::Post`].
    pub form: Vec<(String, String)>,
}

impl FeedRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: Vec::new(),
            form: Vec::new(),
        }
    }

    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            url: url.into(),
            method: Method::Post,
            headers: Vec::new(),
            form,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A successful response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl RawPayload {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 200,
            body: body.into(),
        }
    }

    /// Load a payload saved to disk earlier.
    pub fn read_from(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path)?;
        Ok(Self::new(path.display().to_string(), body))
    }
}

/// Source of raw payloads.
///
/// Implemented by [`FeedClient`] for real traffic and by
/// [`FixtureFetcher`](super::FixtureFetcher) for tests.
pub trait Fetcher {
    fn fetch(
        &self,
        request: &FeedRequest,
    ) -> impl Future<Output = Result<RawPayload, TransportError>> + Send;
}

/// Fetcher backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl FeedClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &FeedConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| TransportError::new("", "invalid user agent"))?;
        headers.insert(USER_AGENT, agent);

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::from_reqwest("", &e))?;

        Ok(Self { http, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Fetcher for FeedClient {
    async fn fetch(&self, request: &FeedRequest) -> Result<RawPayload, TransportError> {
        let url = request.url.as_str();
        let mut builder = match request.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url).form(&request.form),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        debug!(%url, method = ?request.method, "fetching feed");
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(url, format!("HTTP {status}")).with_status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(url, &e))?;

        Ok(RawPayload {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}
