//! Crawl coordinator - sweep orchestration
//!
//! Walks every base prefix in alphabet order, crawls each one to completion
//! through the [`TermCrawler`], and folds the results into the global symbol
//! set and the run report. Prefixes are processed one after another; the
//! concurrency lives inside each term's block fetches.

use crate::config::{Config, CrawlConfig, OutputConfig};
use crate::crawler::aggregator::SymbolSet;
use crate::crawler::enumerator::Alphabet;
use crate::crawler::fetcher::{LookupClient, PageSource};
use crate::crawler::observer::{CrawlEvent, CrawlObserver, TracingObserver};
use crate::crawler::term::TermCrawler;
use crate::output::{generate_markdown_summary, write_symbols, CrawlReport};
use crate::SweepError;
use std::path::Path;
use std::sync::Arc;

/// Everything a finished sweep produced
#[derive(Debug, Clone)]
pub struct Harvest {
    pub symbols: SymbolSet,
    pub report: CrawlReport,
}

/// Main sweep coordinator
pub struct Coordinator<S> {
    terms: TermCrawler<S>,
    alphabet: Alphabet,
    prefix_length: usize,
    observer: Arc<dyn CrawlObserver>,
    config_hash: String,
}

impl Coordinator<LookupClient> {
    /// Creates a coordinator that talks to the configured lookup endpoint
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(SweepError)` - The HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, SweepError> {
        let source = LookupClient::new(&config.endpoint)?;
        Ok(Self::with_source(
            &config.crawl,
            source,
            Arc::new(TracingObserver),
        ))
    }
}

impl<S: PageSource> Coordinator<S> {
    /// Creates a coordinator over an arbitrary page source
    pub fn with_source(config: &CrawlConfig, source: S, observer: Arc<dyn CrawlObserver>) -> Self {
        Self {
            terms: TermCrawler::new(source, config, Arc::clone(&observer)),
            alphabet: Alphabet::from_config(config),
            prefix_length: config.prefix_length,
            observer,
            config_hash: String::new(),
        }
    }

    /// Stamps reports produced by this coordinator with `hash`
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = hash.into();
        self
    }

    pub fn source(&self) -> &S {
        self.terms.source()
    }

    /// Runs the full sweep
    ///
    /// Never fails: probe and block failures are absorbed by the term crawler
    /// and show up in the returned report.
    pub async fn run(&self) -> Harvest {
        let prefixes_total = self.alphabet.prefix_count(self.prefix_length);
        tracing::info!(
            "Starting sweep over {} prefixes of length {}",
            prefixes_total,
            self.prefix_length
        );

        let mut symbols = SymbolSet::new();
        let mut report = CrawlReport::new(&self.config_hash);
        let mut current_lead: Option<char> = None;

        let mut sequence = self.alphabet.prefixes(self.prefix_length);
        let mut prefixes_done = 0;

        while let Some(prefix) = sequence.next() {
            let lead = sequence.current_lead();
            if let Some(previous) = current_lead.filter(|previous| Some(*previous) != lead) {
                self.observer.on_event(&CrawlEvent::LeadCompleted {
                    lead: previous,
                    unique_symbols: symbols.len(),
                });
            }
            current_lead = lead;

            let outcome = self.terms.crawl(&prefix).await;
            let new_symbols = symbols.merge(&outcome.symbols);
            report.record_term(&outcome.summary);
            prefixes_done += 1;

            self.observer.on_event(&CrawlEvent::Progress {
                prefix,
                prefixes_done,
                prefixes_total,
                new_symbols,
                unique_symbols: symbols.len(),
            });
        }

        if let Some(lead) = current_lead {
            self.observer.on_event(&CrawlEvent::LeadCompleted {
                lead,
                unique_symbols: symbols.len(),
            });
        }

        report.finish(symbols.len());
        tracing::info!(
            "Sweep completed: {} unique symbols from {} terms",
            report.unique_symbols,
            report.terms_probed
        );

        Harvest { symbols, report }
    }
}

/// Writes the symbol list and, if configured, the markdown summary
pub fn write_harvest(harvest: &Harvest, output: &OutputConfig) -> Result<(), SweepError> {
    let symbols_path = Path::new(&output.symbols_path);
    write_symbols(&harvest.symbols, symbols_path)?;
    tracing::info!(
        "Wrote {} symbols to {}",
        harvest.symbols.len(),
        symbols_path.display()
    );

    if let Some(summary_path) = &output.summary_path {
        generate_markdown_summary(&harvest.report, Path::new(summary_path))?;
        tracing::info!("Wrote summary to {}", summary_path);
    }

    Ok(())
}

/// Runs a sweep against the live endpoint and writes its output
pub async fn run_crawl(config: &Config, config_hash: &str) -> Result<Harvest, SweepError> {
    let coordinator = Coordinator::new(config)?.with_config_hash(config_hash);
    let harvest = coordinator.run().await;
    write_harvest(&harvest, &config.output)?;
    Ok(harvest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::observer::RecordingObserver;
    use crate::crawler::testing::{fast_config, ScriptedSource};
    use tempfile::tempdir;

    fn coordinator_with(
        source: ScriptedSource,
    ) -> (Coordinator<ScriptedSource>, Arc<RecordingObserver>) {
        let mut config = fast_config();
        config.crawl.alphabet = "AB".to_string();
        let observer = Arc::new(RecordingObserver::new());
        let coordinator = Coordinator::with_source(&config.crawl, source, observer.clone())
            .with_config_hash("feedface");
        (coordinator, observer)
    }

    #[tokio::test]
    async fn test_sweeps_every_prefix_in_order() {
        let source = ScriptedSource::new()
            .with_count("AA", 42)
            .with_count("AB", 9000)
            .with_count("BB", 5);
        let (coordinator, _) = coordinator_with(source);

        let harvest = coordinator.run().await;

        assert_eq!(
            coordinator.source().probed_terms(),
            vec!["AA", "AB", "ABA", "ABB", "BA", "BB"]
        );
        assert_eq!(harvest.symbols.len(), 42 + 9000 + 5);
        assert!(harvest.symbols.contains("AB.8999"));
        assert_eq!(harvest.report.prefixes_crawled, 4);
        assert_eq!(harvest.report.terms_probed, 6);
        assert_eq!(harvest.report.refined_prefixes, vec!["AB".to_string()]);
        assert_eq!(harvest.report.unique_symbols, harvest.symbols.len());
        assert_eq!(harvest.report.config_hash, "feedface");
        assert!(harvest.report.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_progress_and_lead_events() {
        let source = ScriptedSource::new()
            .with_count("AA", 3)
            .with_count("BA", 2);
        let (coordinator, observer) = coordinator_with(source);

        coordinator.run().await;

        let progress = observer.count(|e| matches!(e, CrawlEvent::Progress { .. }));
        assert_eq!(progress, 4);

        let leads: Vec<(char, usize)> = observer
            .events()
            .into_iter()
            .filter_map(|e| match e {
                CrawlEvent::LeadCompleted {
                    lead,
                    unique_symbols,
                } => Some((lead, unique_symbols)),
                _ => None,
            })
            .collect();
        assert_eq!(leads, vec![('A', 3), ('B', 5)]);

        let last = observer
            .events()
            .into_iter()
            .filter(|e| matches!(e, CrawlEvent::Progress { .. }))
            .last();
        assert_eq!(
            last,
            Some(CrawlEvent::Progress {
                prefix: "BB".to_string(),
                prefixes_done: 4,
                prefixes_total: 4,
                new_symbols: 0,
                unique_symbols: 5,
            })
        );
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_the_sweep() {
        let source = ScriptedSource::new()
            .with_count("AA", 500)
            .with_failing_block("AA", 100)
            .with_count("AB", 10)
            .with_failing_probe("AB")
            .with_count("BB", 7);
        let (coordinator, _) = coordinator_with(source);

        let harvest = coordinator.run().await;

        // Rows 100..200 of AA are lost, everything else arrives
        assert_eq!(harvest.symbols.len(), 400 + 7);
        assert!(!harvest.symbols.contains("AA.150"));
        assert_eq!(harvest.report.lost_blocks, vec![("AA".to_string(), 100)]);
        assert_eq!(harvest.report.failed_probes, vec!["AB".to_string()]);
        assert!(!harvest.report.is_complete());
    }

    #[tokio::test]
    async fn test_empty_service_yields_empty_harvest() {
        let (coordinator, _) = coordinator_with(ScriptedSource::new());

        let harvest = coordinator.run().await;

        assert!(harvest.symbols.is_empty());
        assert_eq!(harvest.report.empty_terms, 4);
        assert!(harvest.report.is_complete());
    }

    #[test]
    fn test_write_harvest() {
        let dir = tempdir().unwrap();
        let output = OutputConfig {
            symbols_path: dir.path().join("symbols.txt").display().to_string(),
            log_path: dir.path().join("sweep.log").display().to_string(),
            summary_path: Some(dir.path().join("summary.md").display().to_string()),
        };
        let mut report = CrawlReport::new("");
        report.finish(2);
        let harvest = Harvest {
            symbols: ["MSFT", "AAPL"].into_iter().collect(),
            report,
        };

        write_harvest(&harvest, &output).unwrap();

        let written = std::fs::read_to_string(dir.path().join("symbols.txt")).unwrap();
        assert_eq!(written, "AAPL\nMSFT\n");
        assert!(dir.path().join("summary.md").exists());
        assert!(!dir.path().join("sweep.log").exists());
    }
}
