//! Term crawler: everything that happens for one prefix
//!
//! 1. Probe the prefix for its match count
//! 2. Plan the block offsets inside the visible window
//! 3. Fetch every block concurrently, bounded by a semaphore
//! 4. Merge the pages (and the probe's own rows)
//! 5. If the count reached the window cap, crawl each longer prefix
//!
//! Failures never escape a term. A failed probe yields an empty result, a
//! failed block yields an empty page, and both are recorded in the term's
//! summary so under-collection stays visible.

use crate::config::CrawlConfig;
use crate::crawler::enumerator::Alphabet;
use crate::crawler::fetcher::{Block, BlockFetcher, PageSource};
use crate::crawler::observer::{CrawlEvent, CrawlObserver};
use crate::crawler::parser::Symbol;
use crate::state::TermState;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Plans the block offsets for a prefix with `count` matches
///
/// Offsets are multiples of `block_size` below `min(count, window_cap)`.
/// Blocks lying entirely inside the probe page are skipped because the probe
/// already returned their rows.
///
/// # Example
///
/// ```
/// use ticker_sweep::crawler::plan_blocks;
///
/// assert_eq!(plan_blocks(42, 9000, 100, 25), vec![0]);
/// assert_eq!(plan_blocks(15000, 9000, 100, 25).len(), 90);
/// ```
pub fn plan_blocks(count: u64, window_cap: u64, block_size: u64, probe_size: u64) -> Vec<u64> {
    if block_size == 0 {
        return Vec::new();
    }

    let visible = count.min(window_cap);
    (0..visible)
        .step_by(block_size as usize)
        .filter(|offset| offset + block_size > probe_size)
        .collect()
}

/// What happened while crawling one prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermSummary {
    pub prefix: String,

    /// Final state; always `Done` once the crawl returns
    pub state: TermState,

    /// Count reported by the probe, `None` if the probe request failed
    pub probed_count: Option<u64>,

    /// Symbols found by this prefix's own pages, excluding refinements
    pub own_symbols: usize,

    /// Number of block requests planned
    pub blocks_planned: usize,

    /// Offsets whose block could not be fetched
    pub lost_blocks: Vec<u64>,

    /// The probed count reached the window cap
    pub saturated: bool,

    /// Summaries of the longer prefixes crawled because of saturation
    pub refinements: Vec<TermSummary>,
}

impl TermSummary {
    fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            state: TermState::Idle,
            probed_count: None,
            own_symbols: 0,
            blocks_planned: 0,
            lost_blocks: Vec::new(),
            saturated: false,
            refinements: Vec::new(),
        }
    }

    /// Matched something according to the probe but produced no symbols
    pub fn is_silent(&self) -> bool {
        matches!(self.probed_count, Some(count) if count > 0) && self.own_symbols == 0
    }

    /// Saturated without being refined, so rows beyond the window were missed
    pub fn is_coverage_gap(&self) -> bool {
        self.saturated && self.refinements.is_empty()
    }
}

/// Result of crawling one prefix
#[derive(Debug, Clone)]
pub struct TermOutcome {
    pub summary: TermSummary,

    /// Every symbol found for the prefix, refinements included
    pub symbols: HashSet<Symbol>,
}

/// Crawls single prefixes to completion
pub struct TermCrawler<S> {
    fetcher: Arc<BlockFetcher<S>>,
    limiter: Arc<Semaphore>,
    alphabet: Alphabet,
    window_cap: u64,
    max_prefix_length: usize,
    observer: Arc<dyn CrawlObserver>,
}

impl<S: PageSource> TermCrawler<S> {
    pub fn new(source: S, config: &CrawlConfig, observer: Arc<dyn CrawlObserver>) -> Self {
        Self {
            fetcher: Arc::new(BlockFetcher::new(source, config, observer.clone())),
            limiter: Arc::new(Semaphore::new(config.max_concurrent_blocks.max(1))),
            alphabet: Alphabet::from_config(config),
            window_cap: config.window_cap,
            max_prefix_length: config.max_prefix_length,
            observer,
        }
    }

    pub fn source(&self) -> &S {
        self.fetcher.source()
    }

    /// Crawls `prefix`, refining it if the window saturates
    pub async fn crawl(&self, prefix: &str) -> TermOutcome {
        self.crawl_term(prefix.to_string()).await
    }

    fn crawl_term(&self, prefix: String) -> Pin<Box<dyn Future<Output = TermOutcome> + Send + '_>> {
        Box::pin(async move {
            let mut summary = TermSummary::new(&prefix);

            let probe = match self.fetcher.probe(&prefix).await {
                Ok(probe) => probe,
                Err(error) => {
                    self.observer.on_event(&CrawlEvent::ProbeFailed {
                        prefix: prefix.clone(),
                        error: error.to_string(),
                    });
                    advance(&mut summary, TermState::Done);
                    return self.finish(summary, HashSet::new());
                }
            };

            advance(&mut summary, TermState::Probed);
            summary.probed_count = Some(probe.count);

            if probe.count == 0 {
                advance(&mut summary, TermState::Done);
                return self.finish(summary, HashSet::new());
            }

            advance(&mut summary, TermState::Fetching);
            let offsets = plan_blocks(
                probe.count,
                self.window_cap,
                self.fetcher.block_size(),
                self.fetcher.probe_size(),
            );
            summary.blocks_planned = offsets.len();

            let mut symbols = probe.symbols;
            let (pages, lost) = self.fetch_blocks(&prefix, &offsets).await;
            symbols.extend(pages);
            summary.lost_blocks = lost;

            advance(&mut summary, TermState::Merged);
            summary.own_symbols = symbols.len();

            if probe.count >= self.window_cap {
                summary.saturated = true;

                if prefix.chars().count() < self.max_prefix_length {
                    advance(&mut summary, TermState::Refining);
                    self.observer.on_event(&CrawlEvent::Refining {
                        prefix: prefix.clone(),
                        count: probe.count,
                        extensions: self.alphabet.len(),
                    });

                    let extensions: Vec<String> = self.alphabet.extensions(&prefix).collect();
                    for extension in extensions {
                        let child = self.crawl_term(extension).await;
                        symbols.extend(child.symbols);
                        summary.refinements.push(child.summary);
                    }
                }
            }

            advance(&mut summary, TermState::Done);
            self.finish(summary, symbols)
        })
    }

    /// Fetches all planned blocks, returning the merged rows and lost offsets
    async fn fetch_blocks(&self, prefix: &str, offsets: &[u64]) -> (HashSet<Symbol>, Vec<u64>) {
        let mut tasks = JoinSet::new();

        for &offset in offsets {
            let fetcher = Arc::clone(&self.fetcher);
            let limiter = Arc::clone(&self.limiter);
            let block = Block::new(prefix, offset);

            tasks.spawn(async move {
                // The semaphore is never closed; without a permit we still fetch
                let _permit = limiter.acquire_owned().await.ok();
                let result = fetcher.fetch_block(&block).await;
                (block, result)
            });
        }

        let mut symbols = HashSet::new();
        let mut fetched = HashSet::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((block, Ok(page))) => {
                    fetched.insert(block.offset);
                    symbols.extend(page.symbols);
                }
                Ok((block, Err(error))) => {
                    self.observer.on_event(&CrawlEvent::BlockLost {
                        prefix: block.prefix,
                        offset: block.offset,
                        error: error.to_string(),
                    });
                }
                Err(error) => {
                    tracing::error!("Block task for {} did not complete: {}", prefix, error);
                }
            }
        }

        let lost = offsets
            .iter()
            .copied()
            .filter(|offset| !fetched.contains(offset))
            .collect();

        (symbols, lost)
    }

    fn finish(&self, summary: TermSummary, symbols: HashSet<Symbol>) -> TermOutcome {
        self.observer.on_event(&CrawlEvent::TermCompleted {
            prefix: summary.prefix.clone(),
            count: summary.probed_count.unwrap_or(0),
            symbols: symbols.len(),
        });
        TermOutcome { summary, symbols }
    }
}

fn advance(summary: &mut TermSummary, next: TermState) {
    let from = summary.state;
    match summary.state.transition(next) {
        Ok(()) => tracing::trace!("{}: {} -> {}", summary.prefix, from, next),
        Err(e) => tracing::error!("{}: {}", summary.prefix, e),
    }
}
