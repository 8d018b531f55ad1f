//! Upstream feed configuration.
//!
//! Built once at the command-line boundary and passed by reference into
//! the request builders and the HTTP client. Nothing in the library reads
//! the environment.

/// Caltrain website.
pub const DEFAULT_CALTRAIN_URL: &str = "https://www.caltrain.com";

/// BART real-time API.
pub const DEFAULT_BART_API_URL: &str = "https://api.bart.gov";

/// BART website (fleet lookup pages).
pub const DEFAULT_BART_WEB_URL: &str = "https://www.bart.gov";

/// BART publishes this key for public use; it is not a secret.
pub const DEFAULT_BART_KEY: &str = "MW9S-E7SL-26DU-VV8V";

/// Default per-request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

const DEFAULT_USER_AGENT: &str = concat!("transit-board/", env!("CARGO_PKG_VERSION"));

/// Configuration for every upstream feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Base URL of the Caltrain site.
    pub caltrain_url: String,
    /// Base URL of the BART JSON API.
    pub bart_api_url: String,
    /// Base URL of the BART website.
    pub bart_web_url: String,
    /// BART API key.
    pub bart_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// User-Agent sent when a request does not set its own.
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            caltrain_url: DEFAULT_CALTRAIN_URL.to_string(),
            bart_api_url: DEFAULT_BART_API_URL.to_string(),
            bart_web_url: DEFAULT_BART_WEB_URL.to_string(),
            bart_key: DEFAULT_BART_KEY.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FeedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom Caltrain base URL (for testing or mirrors).
    pub fn with_caltrain_url(mut self, url: impl Into<String>) -> Self {
        self.caltrain_url = trim_base(url.into());
        self
    }

    /// Set a custom BART API base URL.
    pub fn with_bart_api_url(mut self, url: impl Into<String>) -> Self {
        self.bart_api_url = trim_base(url.into());
        self
    }

    /// Set a custom BART website base URL.
    pub fn with_bart_web_url(mut self, url: impl Into<String>) -> Self {
        self.bart_web_url = trim_base(url.into());
        self
    }

    pub fn with_bart_key(mut self, key: impl Into<String>) -> Self {
        self.bart_key = key.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set maximum concurrent requests. Zero is treated as one.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
