//! Lookup fetcher implementation
//!
//! This module handles all requests to the lookup service, including:
//! - Building an HTTP client that sends browser-like headers
//! - Building lookup URLs from a term, an offset and a page size
//! - The count probe and block fetches, both with bounded retry
//!
//! The transport sits behind the [`PageSource`] trait so the crawl logic can
//! run against any source of lookup pages.

use crate::config::{CrawlConfig, EndpointConfig};
use crate::crawler::observer::{CrawlEvent, CrawlObserver};
use crate::crawler::parser::{extract_count, extract_symbols, Symbol};
use crate::crawler::retry::{with_retry, RetryPolicy};
use crate::{FetchError, FetchResult, SweepError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::Client;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Anything that can return the body of one lookup results page
///
/// A call is a single attempt: retrying is the caller's job.
pub trait PageSource: Send + Sync + 'static {
    /// Fetches `size` rows for `term` starting at row `offset`
    fn fetch_page(
        &self,
        term: &str,
        offset: u64,
        size: u64,
    ) -> impl Future<Output = FetchResult<String>> + Send;
}

/// One page request within a prefix's result window
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Block {
    pub prefix: String,
    pub offset: u64,
}

impl Block {
    pub fn new(prefix: &str, offset: u64) -> Self {
        Self {
            prefix: prefix.to_string(),
            offset,
        }
    }
}

/// Outcome of the count probe for a prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub prefix: String,

    /// Reported match count, 0 when it could not be read
    pub count: u64,

    /// Rows listed on the probe page itself
    pub symbols: HashSet<Symbol>,
}

/// Symbols read from one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub block: Block,
    pub symbols: HashSet<Symbol>,
}

/// Builds an HTTP client that presents itself like a desktop browser
///
/// Accept-Encoding is negotiated by reqwest itself (gzip, deflate, br) so
/// that responses are transparently decompressed.
///
/// # Example
///
/// ```no_run
/// use ticker_sweep::config::EndpointConfig;
/// use ticker_sweep::crawler::build_http_client;
///
/// let client = build_http_client(&EndpointConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &EndpointConfig) -> Result<Client, SweepError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value(&config.accept)?);
    headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()?;

    Ok(client)
}

fn header_value(value: &str) -> Result<HeaderValue, SweepError> {
    HeaderValue::from_str(value).map_err(|e| {
        SweepError::Config(crate::ConfigError::Validation(format!(
            "invalid header value '{}': {}",
            value, e
        )))
    })
}

/// Page source backed by the real lookup endpoint
#[derive(Debug, Clone)]
pub struct LookupClient {
    client: Client,
    base_url: Url,
    mode: String,
}

impl LookupClient {
    pub fn new(config: &EndpointConfig) -> Result<Self, SweepError> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: Url::parse(&config.base_url)?,
            mode: config.mode.clone(),
        })
    }

    /// Builds `base?s={term}&t={mode}&b={offset}&c={size}`
    pub fn page_url(&self, term: &str, offset: u64, size: u64) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("s", term)
            .append_pair("t", &self.mode)
            .append_pair("b", &offset.to_string())
            .append_pair("c", &size.to_string());
        url
    }
}

impl PageSource for LookupClient {
    async fn fetch_page(&self, term: &str, offset: u64, size: u64) -> FetchResult<String> {
        let url = self.page_url(term, offset, size);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // The body is read in full or the attempt fails
        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))
    }
}

/// Retrieves probe and block pages with retry
pub struct BlockFetcher<S> {
    source: S,
    retry: RetryPolicy,
    block_size: u64,
    probe_size: u64,
    observer: Arc<dyn CrawlObserver>,
}

impl<S: PageSource> BlockFetcher<S> {
    pub fn new(source: S, config: &CrawlConfig, observer: Arc<dyn CrawlObserver>) -> Self {
        Self {
            source,
            retry: RetryPolicy::from_config(config),
            block_size: config.block_size,
            probe_size: config.probe_size,
            observer,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn probe_size(&self) -> u64 {
        self.probe_size
    }

    /// Requests the first, small page for `prefix` to learn its match count
    ///
    /// An unreadable count is reported and treated as 0; only transport
    /// failures that survive every retry are returned as errors.
    pub async fn probe(&self, prefix: &str) -> FetchResult<ProbeResult> {
        let body = self.fetch_with_retry(prefix, 0, self.probe_size).await?;

        let count = match extract_count(&body) {
            Ok(count) => count,
            Err(message) => {
                self.observer.on_event(&CrawlEvent::ParseFailed {
                    prefix: prefix.to_string(),
                    message,
                });
                0
            }
        };

        self.observer.on_event(&CrawlEvent::Probed {
            prefix: prefix.to_string(),
            count,
        });

        Ok(ProbeResult {
            prefix: prefix.to_string(),
            count,
            symbols: extract_symbols(&body),
        })
    }

    /// Requests one full block of rows
    pub async fn fetch_block(&self, block: &Block) -> FetchResult<PageResult> {
        let body = self
            .fetch_with_retry(&block.prefix, block.offset, self.block_size)
            .await?;

        Ok(PageResult {
            block: block.clone(),
            symbols: extract_symbols(&body),
        })
    }

    async fn fetch_with_retry(&self, term: &str, offset: u64, size: u64) -> FetchResult<String> {
        let request = format!("{}@{}", term, offset);
        let source = &self.source;
        with_retry(&self.retry, &request, self.observer.as_ref(), move || {
            source.fetch_page(term, offset, size)
        })
        .await
    }
}
