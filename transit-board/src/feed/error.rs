//! Feed error types.

/// A request that did not produce a successful HTTP response.
///
/// Covers connection failures, timeouts and non-2xx statuses. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("HTTP request to {url} failed: {cause}")]
pub struct TransportError {
    pub url: String,
    /// Status code, when the server answered at all.
    pub status: Option<u16>,
    pub cause: String,
}

impl TransportError {
    pub fn new(url: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: None,
            cause: cause.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Wrap a reqwest error for `url`.
    pub fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        let cause = if err.is_timeout() {
            "timed out".to_string()
        } else {
            err.to_string()
        };
        Self {
            url: url.to_string(),
            status: err.status().map(|s| s.as_u16()),
            cause,
        }
    }
}

/// Why a station's feed produced no departures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// The upstream could not be reached or answered with an error status.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The payload was not valid JSON or HTML of the expected shape.
    #[error("could not decode payload: {0}")]
    Decode(String),

    /// The payload was well formed but the data was not there.
    ///
    /// Carries the upstream's own diagnostic when it gave one.
    #[error("{0}")]
    StructuralMismatch(String),
}

/// A failure tied to the station it happened for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("at {station_key}: {error}")]
pub struct ParseFailure {
    pub station_key: String,
    pub error: FeedError,
}

impl ParseFailure {
    pub fn new(station_key: impl Into<String>, error: impl Into<FeedError>) -> Self {
        Self {
            station_key: station_key.into(),
            error: error.into(),
        }
    }

    /// Human-readable diagnostic.
    pub fn reason(&self) -> String {
        self.error.to_string()
    }
}
