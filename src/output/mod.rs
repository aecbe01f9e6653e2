//! Output module for harvest results
//!
//! This module handles:
//! - Writing the symbol list
//! - Building the run report
//! - Generating markdown summaries

mod markdown;
mod report;
mod symbols;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use report::{print_report, CrawlReport};
pub use symbols::{read_symbols, write_symbols};

use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for output operations
pub type OutputResult<T> = Result<T, OutputError>;
