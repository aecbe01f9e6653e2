//! Crawl observation
//!
//! Components report what happens during a crawl through an injected
//! [`CrawlObserver`] instead of logging directly. The default
//! [`TracingObserver`] turns every event into a `tracing` record; tests use
//! [`RecordingObserver`] to assert on the event stream.

use std::sync::Mutex;

/// Something noteworthy that happened during a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// One attempt of a request failed; more attempts may follow
    AttemptFailed {
        request: String,
        attempt: u32,
        max_attempts: u32,
        error: String,
    },

    /// The count probe for a term returned
    Probed { prefix: String, count: u64 },

    /// The count could not be read from the probe page
    ParseFailed { prefix: String, message: String },

    /// The probe request gave up after all retries
    ProbeFailed { prefix: String, error: String },

    /// A block request gave up after all retries; its rows are lost for this run
    BlockLost {
        prefix: String,
        offset: u64,
        error: String,
    },

    /// A saturated term is being split into longer prefixes
    Refining {
        prefix: String,
        count: u64,
        extensions: usize,
    },

    /// A term finished, including any refinements
    TermCompleted {
        prefix: String,
        count: u64,
        symbols: usize,
    },

    /// The orchestrator folded one top-level prefix into the global set
    Progress {
        prefix: String,
        prefixes_done: usize,
        prefixes_total: usize,
        new_symbols: usize,
        unique_symbols: usize,
    },

    /// Every prefix starting with `lead` has been crawled
    LeadCompleted { lead: char, unique_symbols: usize },
}

/// Receives crawl events
///
/// Implementations must be thread-safe: block fetches report from spawned
/// tasks.
pub trait CrawlObserver: Send + Sync {
    fn on_event(&self, event: &CrawlEvent);
}

/// Observer that forwards every event to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CrawlObserver for TracingObserver {
    fn on_event(&self, event: &CrawlEvent) {
        match event {
            CrawlEvent::AttemptFailed {
                request,
                attempt,
                max_attempts,
                error,
            } => {
                tracing::warn!(
                    "Attempt {}/{} failed for {}: {}",
                    attempt,
                    max_attempts,
                    request,
                    error
                );
            }
            CrawlEvent::Probed { prefix, count } => {
                tracing::info!("Count for {}: {}", prefix, count);
            }
            CrawlEvent::ParseFailed { prefix, message } => {
                tracing::error!("Failed to extract count for {}: {}", prefix, message);
            }
            CrawlEvent::ProbeFailed { prefix, error } => {
                tracing::error!("Error processing search term {}: {}", prefix, error);
            }
            CrawlEvent::BlockLost {
                prefix,
                offset,
                error,
            } => {
                tracing::error!("Error processing block {} for {}: {}", offset, prefix, error);
            }
            CrawlEvent::Refining {
                prefix,
                count,
                extensions,
            } => {
                tracing::info!(
                    "{} saturated the window with {} matches, refining into {} prefixes",
                    prefix,
                    count,
                    extensions
                );
            }
            CrawlEvent::TermCompleted {
                prefix,
                count,
                symbols,
            } => {
                tracing::debug!("{} done: {} symbols from {} matches", prefix, symbols, count);
            }
            CrawlEvent::Progress {
                prefix,
                prefixes_done,
                prefixes_total,
                new_symbols,
                unique_symbols,
            } => {
                tracing::info!(
                    "Progress: {}/{} prefixes ({}, +{}), total symbols so far: {}",
                    prefixes_done,
                    prefixes_total,
                    prefix,
                    new_symbols,
                    unique_symbols
                );
            }
            CrawlEvent::LeadCompleted {
                lead,
                unique_symbols,
            } => {
                tracing::info!(
                    "Finished prefixes starting with '{}': {} unique symbols",
                    lead,
                    unique_symbols
                );
            }
        }
    }
}

/// Observer that keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<CrawlEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events seen so far
    pub fn events(&self) -> Vec<CrawlEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Counts the recorded events matching `predicate`
    pub fn count(&self, predicate: impl Fn(&CrawlEvent) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

impl CrawlObserver for RecordingObserver {
    fn on_event(&self, event: &CrawlEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
