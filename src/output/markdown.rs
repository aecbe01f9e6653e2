//! Markdown summary generation
//!
//! Renders a [`CrawlReport`] as a human-readable markdown document covering
//! run metadata, totals and every kind of under-collection.

use crate::output::report::CrawlReport;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of `report` to `output_path`
///
/// # Arguments
///
/// * `report` - The finished crawl report
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(report: &CrawlReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Ticker-Sweep Harvest Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    if let Some(finished) = &report.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = report.duration_seconds() {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Config Hash**: {}\n\n", report.config_hash));

    // Totals
    md.push_str("## Overall Statistics\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Unique Symbols | {} |\n", report.unique_symbols));
    md.push_str(&format!("| Prefixes Crawled | {} |\n", report.prefixes_crawled));
    md.push_str(&format!("| Terms Probed | {} |\n", report.terms_probed));
    md.push_str(&format!("| Terms Without Matches | {} |\n", report.empty_terms));
    md.push_str(&format!("| Blocks Planned | {} |\n", report.blocks_planned));
    md.push_str(&format!("| Blocks Fetched | {} |\n\n", report.blocks_fetched()));

    if !report.refined_prefixes.is_empty() {
        md.push_str("## Refined Prefixes\n\n");
        for prefix in &report.refined_prefixes {
            md.push_str(&format!("- {}\n", prefix));
        }
        md.push('\n');
    }

    if report.is_complete() {
        md.push_str("## Under-Collection\n\nNo probes or blocks were lost.\n\n");
    } else {
        md.push_str("## Under-Collection\n\n");

        if !report.failed_probes.is_empty() {
            md.push_str("### Failed Probes\n\n");
            for prefix in &report.failed_probes {
                md.push_str(&format!("- {}\n", prefix));
            }
            md.push('\n');
        }

        if !report.lost_blocks.is_empty() {
            md.push_str("### Lost Blocks\n\n");
            md.push_str("| Prefix | Offset |\n");
            md.push_str("|--------|--------|\n");
            for (prefix, offset) in &report.lost_blocks {
                md.push_str(&format!("| {} | {} |\n", prefix, offset));
            }
            md.push('\n');
        }

        if !report.silent_prefixes.is_empty() {
            md.push_str("### Matched But Empty\n\n");
            md.push_str("| Prefix | Reported Matches |\n");
            md.push_str("|--------|------------------|\n");
            for (prefix, count) in &report.silent_prefixes {
                md.push_str(&format!("| {} | {} |\n", prefix, count));
            }
            md.push('\n');
        }
    }

    if !report.coverage_gaps.is_empty() {
        md.push_str("## Saturated At Maximum Prefix Length\n\n");
        md.push_str("| Prefix | Reported Matches |\n");
        md.push_str("|--------|------------------|\n");
        for (prefix, count) in &report.coverage_gaps {
            md.push_str(&format!("| {} | {} |\n", prefix, count));
        }
        md.push('\n');
    }

    md
}
