//! In-memory fetcher serving canned payloads.
//!
//! Stands in for [`FeedClient`](super::FeedClient) in tests and offline
//! runs. Responses are keyed by exact URL; anything unknown is a 404.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use super::client::{FeedRequest, Fetcher, RawPayload};
use super::error::TransportError;

#[derive(Debug, Clone)]
enum Canned {
    Body(String),
    Status(u16),
}

/// Fetcher that answers from a fixed table.
#[derive(Debug, Clone, Default)]
pub struct FixtureFetcher {
    responses: HashMap<String, Canned>,
    delay: Option<Duration>,
    /// URLs in the order they were requested.
    requested: Arc<Mutex<Vec<String>>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Canned::Body(body.into()));
        self
    }

    /// Answer `url` with an error status.
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses.insert(url.into(), Canned::Status(status));
        self
    }

    /// Wait this long before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every URL fetched so far.
    pub async fn requested(&self) -> Vec<String> {
        self.requested.lock().await.clone()
    }
}

impl Fetcher for FixtureFetcher {
    async fn fetch(&self, request: &FeedRequest) -> Result<RawPayload, TransportError> {
        self.requested.lock().await.push(request.url.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.responses.get(&request.url) {
            Some(Canned::Body(body)) => Ok(RawPayload::new(request.url.clone(), body.clone())),
            Some(Canned::Status(status)) => {
                Err(TransportError::new(&request.url, format!("HTTP {status}")).with_status(*status))
            }
            None => Err(TransportError::new(&request.url, "HTTP 404 Not Found").with_status(404)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_canned_responses() {
        let fetcher = FixtureFetcher::new()
            .with("http://x/ok", "hello")
            .with_status("http://x/down", 503);

        let payload = fetcher.fetch(&FeedRequest::get("http://x/ok")).await.unwrap();
        assert_eq!(payload.body, "hello");

        let err = fetcher.fetch(&FeedRequest::get("http://x/down")).await.unwrap_err();
        assert_eq!(err.status, Some(503));
        assert_eq!(err.to_string(), "HTTP request to http://x/down failed: HTTP 503");

        let err = fetcher.fetch(&FeedRequest::get("http://x/other")).await.unwrap_err();
        assert_eq!(err.status, Some(404));

        assert_eq!(
            fetcher.requested().await,
            vec!["http://x/ok", "http://x/down", "http://x/other"]
        );
    }
}
