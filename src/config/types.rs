use serde::Deserialize;
use std::time::Duration;

/// Default search alphabet: A-Z followed by 0-9
pub const DEFAULT_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default lookup endpoint
pub const DEFAULT_BASE_URL: &str = "https://finance.yahoo.com/lookup/equity";

/// Default browser-like user agent sent with every lookup request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/71.0.3578.98 Safari/537.36";

/// Main configuration structure for Ticker-Sweep
///
/// Every section and field is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub endpoint: EndpointConfig,
    pub output: OutputConfig,
}

/// Enumeration, pagination and retry parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Ordered characters used to build prefixes
    pub alphabet: String,

    /// Length of the prefixes enumerated up front
    pub prefix_length: usize,

    /// Longest prefix a saturated term may be refined into
    ///
    /// The default of 3 refines a saturated 2-character prefix once. Larger
    /// values keep refining saturated refinements.
    pub max_prefix_length: usize,

    /// Maximum number of results the service exposes for one query
    pub window_cap: u64,

    /// Rows requested per block fetch
    pub block_size: u64,

    /// Rows requested by the count probe
    pub probe_size: u64,

    /// Attempts per request, including the first one
    pub max_attempts: u32,

    /// Fixed delay between attempts (milliseconds)
    pub retry_delay_ms: u64,

    /// Maximum number of block requests in flight for one prefix
    pub max_concurrent_blocks: usize,
}

impl CrawlConfig {
    /// Returns the retry delay as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Returns the alphabet as an ordered list of characters
    pub fn alphabet_chars(&self) -> Vec<char> {
        self.alphabet.chars().collect()
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.to_string(),
            prefix_length: 2,
            max_prefix_length: 3,
            window_cap: 9000,
            block_size: 100,
            probe_size: 25,
            max_attempts: 3,
            retry_delay_ms: 1000,
            max_concurrent_blocks: 16,
        }
    }
}

/// Lookup service endpoint and request headers
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EndpointConfig {
    /// URL of the lookup page, without query parameters
    pub base_url: String,

    /// Value of the fixed `t` mode parameter
    pub mode: String,

    /// User-Agent header value
    pub user_agent: String,

    /// Accept header value
    pub accept: String,

    /// Accept-Language header value
    pub accept_language: String,

    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    pub connect_timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            mode: "A".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: "text/html".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path of the symbol list written at the end of the crawl
    pub symbols_path: String,

    /// Path of the append-only operational log
    pub log_path: String,

    /// Path of the markdown run summary, if one should be written
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            symbols_path: "ticker-symbols.txt".to_string(),
            log_path: "ticker-sweep.log".to_string(),
            summary_path: None,
        }
    }
}
