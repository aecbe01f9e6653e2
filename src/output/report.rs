//! Run report
//!
//! Collects per-term summaries into crawl-wide totals and keeps the lists a
//! reader needs to judge coverage: prefixes whose probe failed, blocks that
//! were lost, prefixes that matched but yielded nothing, and saturated
//! prefixes that could not be refined further.

use crate::crawler::TermSummary;
use chrono::{DateTime, Utc};

/// Summary of one harvest
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    // Run metadata
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub config_hash: String,

    // Totals
    pub prefixes_crawled: u64,
    pub terms_probed: u64,
    pub empty_terms: u64,
    pub blocks_planned: u64,
    pub unique_symbols: usize,

    /// Prefixes that were split into longer ones
    pub refined_prefixes: Vec<String>,

    /// Prefixes whose probe gave up after all retries
    pub failed_probes: Vec<String>,

    /// (prefix, offset) of every block that could not be fetched
    pub lost_blocks: Vec<(String, u64)>,

    /// (prefix, count) of terms that reported matches but produced no symbols
    pub silent_prefixes: Vec<(String, u64)>,

    /// (prefix, count) of saturated terms that were not refined
    pub coverage_gaps: Vec<(String, u64)>,
}

impl CrawlReport {
    /// Starts a report stamped with the current time
    pub fn new(config_hash: &str) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            config_hash: config_hash.to_string(),
            prefixes_crawled: 0,
            terms_probed: 0,
            empty_terms: 0,
            blocks_planned: 0,
            unique_symbols: 0,
            refined_prefixes: Vec::new(),
            failed_probes: Vec::new(),
            lost_blocks: Vec::new(),
            silent_prefixes: Vec::new(),
            coverage_gaps: Vec::new(),
        }
    }

    /// Records a top-level prefix together with all of its refinements
    pub fn record_term(&mut self, summary: &TermSummary) {
        self.prefixes_crawled += 1;
        self.record_summary(summary);
    }

    fn record_summary(&mut self, summary: &TermSummary) {
        self.terms_probed += 1;
        self.blocks_planned += summary.blocks_planned as u64;

        match summary.probed_count {
            None => self.failed_probes.push(summary.prefix.clone()),
            Some(0) => self.empty_terms += 1,
            Some(count) => {
                if summary.is_silent() {
                    self.silent_prefixes.push((summary.prefix.clone(), count));
                }
                if summary.is_coverage_gap() {
                    self.coverage_gaps.push((summary.prefix.clone(), count));
                }
            }
        }

        self.lost_blocks.extend(
            summary
                .lost_blocks
                .iter()
                .map(|offset| (summary.prefix.clone(), *offset)),
        );

        if !summary.refinements.is_empty() {
            self.refined_prefixes.push(summary.prefix.clone());
        }

        for refinement in &summary.refinements {
            self.record_summary(refinement);
        }
    }

    /// Stamps the finish time and the final symbol total
    pub fn finish(&mut self, unique_symbols: usize) {
        self.unique_symbols = unique_symbols;
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Blocks that were planned and fetched successfully
    pub fn blocks_fetched(&self) -> u64 {
        self.blocks_planned - self.lost_blocks.len() as u64
    }

    /// True when nothing was lost to failures
    ///
    /// Coverage gaps are a property of the service window, not a failure, and
    /// do not count against completeness.
    pub fn is_complete(&self) -> bool {
        self.failed_probes.is_empty()
            && self.lost_blocks.is_empty()
            && self.silent_prefixes.is_empty()
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Harvest Summary ===\n");

    println!("Overview:");
    println!("  Unique symbols: {}", report.unique_symbols);
    println!("  Prefixes crawled: {}", report.prefixes_crawled);
    println!("  Terms probed (incl. refinements): {}", report.terms_probed);
    println!("  Terms without matches: {}", report.empty_terms);
    println!(
        "  Blocks fetched: {} / {}",
        report.blocks_fetched(),
        report.blocks_planned
    );
    if let Some(duration) = report.duration_seconds() {
        println!("  Duration: {}s", duration);
    }
    println!();

    if !report.refined_prefixes.is_empty() {
        println!("Refined Prefixes ({}):", report.refined_prefixes.len());
        println!("  {}", report.refined_prefixes.join(", "));
        println!();
    }

    if report.is_complete() {
        println!("No probes or blocks were lost.");
    } else {
        println!("Under-collection:");
        println!("  Failed probes: {}", report.failed_probes.len());
        for prefix in &report.failed_probes {
            println!("    - {}", prefix);
        }
        println!("  Lost blocks: {}", report.lost_blocks.len());
        for (prefix, offset) in &report.lost_blocks {
            println!("    - {} @ {}", prefix, offset);
        }
        println!(
            "  Matched but empty prefixes: {}",
            report.silent_prefixes.len()
        );
        for (prefix, count) in &report.silent_prefixes {
            println!("    - {} ({} matches)", prefix, count);
        }
    }

    if !report.coverage_gaps.is_empty() {
        println!();
        println!(
            "Saturated at maximum prefix length ({}):",
            report.coverage_gaps.len()
        );
        for (prefix, count) in &report.coverage_gaps {
            println!("  - {} ({} matches)", prefix, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TermState;

    fn summary(prefix: &str, count: Option<u64>, own: usize) -> TermSummary {
        TermSummary {
            prefix: prefix.to_string(),
            state: TermState::Done,
            probed_count: count,
            own_symbols: own,
            blocks_planned: 0,
            lost_blocks: Vec::new(),
            saturated: false,
            refinements: Vec::new(),
        }
    }

    #[test]
    fn test_new_report_is_empty() {
        let report = CrawlReport::new("abc");
        assert_eq!(report.prefixes_crawled, 0);
        assert_eq!(report.config_hash, "abc");
        assert!(report.finished_at.is_none());
        assert!(report.is_complete());
    }

    #[test]
    fn test_distinguishes_silent_from_empty() {
        let mut report = CrawlReport::new("");
        report.record_term(&summary("AA", Some(0), 0));
        report.record_term(&summary("AB", Some(12), 0));
        report.record_term(&summary("AC", None, 0));
        report.record_term(&summary("AD", Some(5), 5));

        assert_eq!(report.prefixes_crawled, 4);
        assert_eq!(report.empty_terms, 1);
        assert_eq!(report.silent_prefixes, vec![("AB".to_string(), 12)]);
        assert_eq!(report.failed_probes, vec!["AC".to_string()]);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_refinements_are_walked() {
        let mut gap = summary("BBQ", Some(12000), 9000);
        gap.saturated = true;
        gap.blocks_planned = 90;

        let mut lossy = summary("BBA", Some(150), 50);
        lossy.blocks_planned = 2;
        lossy.lost_blocks = vec![100];

        let mut parent = summary("BB", Some(15000), 9000);
        parent.saturated = true;
        parent.blocks_planned = 90;
        parent.refinements = vec![lossy, gap];

        let mut report = CrawlReport::new("");
        report.record_term(&parent);

        assert_eq!(report.prefixes_crawled, 1);
        assert_eq!(report.terms_probed, 3);
        assert_eq!(report.blocks_planned, 182);
        assert_eq!(report.blocks_fetched(), 181);
        assert_eq!(report.refined_prefixes, vec!["BB".to_string()]);
        assert_eq!(report.lost_blocks, vec![("BBA".to_string(), 100)]);
        assert_eq!(report.coverage_gaps, vec![("BBQ".to_string(), 12000)]);
    }

    #[test]
    fn test_finish() {
        let mut report = CrawlReport::new("");
        report.finish(42);
        assert_eq!(report.unique_symbols, 42);
        assert!(report.duration_seconds().is_some());
    }
}
