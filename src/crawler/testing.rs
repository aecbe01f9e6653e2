//! In-memory lookup service for unit tests

use crate::config::Config;
use crate::crawler::fetcher::PageSource;
use crate::{FetchError, FetchResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const PROBE_SIZE: u64 = 25;
const WINDOW_CAP: u64 = 9000;

/// Default configuration without retry delays
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.crawl.retry_delay_ms = 0;
    config.crawl.max_concurrent_blocks = 8;
    config
}

/// Renders a lookup page the way the real service lays it out
pub fn lookup_page(count: u64, symbols: &[String]) -> String {
    let rows: String = symbols
        .iter()
        .map(|s| format!(r#"<tr><td aria-label="Symbol">{}</td></tr>"#, s))
        .collect();
    format!(
        r#"<html><body><span>Stocks ({})</span><table class="W(100%)"><tbody>{}</tbody></table></body></html>"#,
        count, rows
    )
}

/// Simulated lookup service
///
/// A term with count `n` lists rows `TERM.0` .. `TERM.{n-1}`, of which only
/// the first 9000 are reachable. Unknown terms have no matches.
#[derive(Default)]
pub struct ScriptedSource {
    counts: HashMap<String, u64>,
    garbled: HashSet<String>,
    hidden_rows: HashSet<String>,
    failing_probes: HashSet<String>,
    failing_blocks: HashSet<(String, u64)>,
    flaky_blocks: Mutex<HashMap<(String, u64), u32>>,
    requests: Mutex<Vec<(String, u64, u64)>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(mut self, term: &str, count: u64) -> Self {
        self.counts.insert(term.to_string(), count);
        self
    }

    /// Serves pages for `term` without a readable count
    pub fn with_garbled(mut self, term: &str) -> Self {
        self.garbled.insert(term.to_string());
        self
    }

    /// Serves pages for `term` that report a count but list no rows
    pub fn with_hidden_rows(mut self, term: &str) -> Self {
        self.hidden_rows.insert(term.to_string());
        self
    }

    pub fn with_failing_probe(mut self, term: &str) -> Self {
        self.failing_probes.insert(term.to_string());
        self
    }

    pub fn with_failing_block(mut self, term: &str, offset: u64) -> Self {
        self.failing_blocks.insert((term.to_string(), offset));
        self
    }

    /// Fails the first `failures` requests for a block, then serves it
    pub fn with_flaky_block(self, term: &str, offset: u64, failures: u32) -> Self {
        if let Ok(mut flaky) = self.flaky_blocks.lock() {
            flaky.insert((term.to_string(), offset), failures);
        }
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of block requests (not probes) made for `term` at `offset`
    pub fn requests_for(&self, term: &str, offset: u64) -> usize {
        self.requests()
            .iter()
            .filter(|(t, o, s)| t == term && *o == offset && *s != PROBE_SIZE)
            .count()
    }

    /// Distinct block offsets requested for `term`, ascending
    pub fn block_offsets(&self, term: &str) -> Vec<u64> {
        let mut offsets: Vec<u64> = self
            .requests()
            .iter()
            .filter(|(t, _, s)| t == term && *s != PROBE_SIZE)
            .map(|(_, o, _)| *o)
            .collect();
        offsets.sort_unstable();
        offsets.dedup();
        offsets
    }

    /// Terms that were probed, in request order
    pub fn probed_terms(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|(_, _, s)| *s == PROBE_SIZE)
            .map(|(t, _, _)| t)
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn requests(&self) -> Vec<(String, u64, u64)> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn respond(&self, term: &str, offset: u64, size: u64) -> FetchResult<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((term.to_string(), offset, size));
        }

        let unavailable = || FetchError::Status {
            url: format!("scripted://{}?b={}&c={}", term, offset, size),
            status: 503,
        };

        let is_probe = size == PROBE_SIZE;
        if is_probe && self.failing_probes.contains(term) {
            return Err(unavailable());
        }
        if !is_probe {
            let key = (term.to_string(), offset);
            if self.failing_blocks.contains(&key) {
                return Err(unavailable());
            }
            if let Ok(mut flaky) = self.flaky_blocks.lock() {
                if let Some(remaining) = flaky.get_mut(&key) {
                    if *remaining > 0 {
                        *remaining -= 1;
                        return Err(unavailable());
                    }
                }
            }
        }

        let count = self.counts.get(term).copied().unwrap_or(0);
        let end = (offset + size).min(count).min(WINDOW_CAP);
        let symbols: Vec<String> = (offset..end).map(|n| format!("{}.{}", term, n)).collect();

        if self.garbled.contains(term) {
            return Ok(format!("<html><body>Lookup unavailable {}</body></html>", symbols.len()));
        }

        if self.hidden_rows.contains(term) {
            return Ok(lookup_page(count, &[]));
        }

        Ok(lookup_page(count, &symbols))
    }
}

impl PageSource for ScriptedSource {
    async fn fetch_page(&self, term: &str, offset: u64, size: u64) -> FetchResult<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let response = self.respond(term, offset, size);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}
