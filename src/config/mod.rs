//! Configuration module for Ticker-Sweep
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every crawl parameter has a documented default, so running without a
//! file reproduces the stock behavior.
//!
//! # Example
//!
//! ```no_run
//! use ticker_sweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sweep.toml")).unwrap();
//! println!("Blocks hold {} rows", config.crawl.block_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, EndpointConfig, OutputConfig, DEFAULT_ALPHABET, DEFAULT_BASE_URL,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
