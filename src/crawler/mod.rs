//! Crawler module for the ticker sweep
//!
//! This module contains the core sweeping logic, including:
//! - Prefix enumeration over the search alphabet
//! - Lookup page fetching with bounded retry
//! - HTML parsing of counts and symbol rows
//! - Per-term block planning, concurrent fetching and refinement
//! - Overall sweep coordination

mod aggregator;
mod coordinator;
mod enumerator;
mod fetcher;
mod observer;
mod parser;
mod retry;
mod term;

#[cfg(test)]
mod testing;

pub use aggregator::SymbolSet;
pub use coordinator::{run_crawl, write_harvest, Coordinator, Harvest};
pub use enumerator::{Alphabet, PrefixSequence};
pub use fetcher::{
    build_http_client, Block, BlockFetcher, LookupClient, PageResult, PageSource, ProbeResult,
};
pub use observer::{CrawlEvent, CrawlObserver, RecordingObserver, TracingObserver};
pub use parser::{
    extract_count, extract_symbols, parse_lookup_page, try_parse_lookup_page, ParsedPage, Symbol,
};
pub use retry::{with_retry, RetryPolicy};
pub use term::{plan_blocks, TermCrawler, TermOutcome, TermSummary};

use crate::config::Config;
use crate::SweepError;

/// Runs a complete sweep
///
/// This is the main entry point for a harvest. It will:
/// 1. Build the HTTP client for the lookup endpoint
/// 2. Crawl every base prefix, refining saturated ones
/// 3. Merge all symbols into one deduplicated set
/// 4. Write the symbol list and optional summary
///
/// # Arguments
///
/// * `config` - The validated sweep configuration
/// * `config_hash` - Hash of the configuration file, recorded in the report
///
/// # Returns
///
/// * `Ok(Harvest)` - Sweep completed; the report lists any under-collection
/// * `Err(SweepError)` - The client could not be built or output not written
pub async fn crawl(config: &Config, config_hash: &str) -> Result<Harvest, SweepError> {
    run_crawl(config, config_hash).await
}
