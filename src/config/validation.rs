use crate::config::types::{Config, CrawlConfig, EndpointConfig, OutputConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Longest prefix the crawler will ever build
const PREFIX_LENGTH_LIMIT: usize = 6;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_endpoint_config(&config.endpoint)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl parameters
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_alphabet(&config.alphabet)?;

    if config.prefix_length < 1 || config.prefix_length > config.max_prefix_length {
        return Err(ConfigError::Validation(format!(
            "prefix_length must be between 1 and max_prefix_length ({}), got {}",
            config.max_prefix_length, config.prefix_length
        )));
    }

    if config.max_prefix_length > PREFIX_LENGTH_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_prefix_length must be <= {}, got {}",
            PREFIX_LENGTH_LIMIT, config.max_prefix_length
        )));
    }

    if config.block_size < 1 || config.probe_size < 1 || config.window_cap < 1 {
        return Err(ConfigError::Validation(format!(
            "window_cap, block_size and probe_size must be >= 1, got {}, {}, {}",
            config.window_cap, config.block_size, config.probe_size
        )));
    }

    if config.window_cap % config.block_size != 0 {
        return Err(ConfigError::Validation(format!(
            "window_cap ({}) must be a multiple of block_size ({})",
            config.window_cap, config.block_size
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.max_concurrent_blocks < 1 || config.max_concurrent_blocks > 256 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_blocks must be between 1 and 256, got {}",
            config.max_concurrent_blocks
        )));
    }

    Ok(())
}

/// Validates the search alphabet: non-empty, ASCII alphanumeric, no repeats
fn validate_alphabet(alphabet: &str) -> Result<(), ConfigError> {
    if alphabet.is_empty() {
        return Err(ConfigError::Validation(
            "alphabet cannot be empty".to_string(),
        ));
    }

    if !alphabet.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "alphabet must contain only ASCII letters and digits, got '{}'",
            alphabet
        )));
    }

    let mut seen = HashSet::new();
    if let Some(dup) = alphabet.chars().find(|c| !seen.insert(*c)) {
        return Err(ConfigError::Validation(format!(
            "alphabet contains '{}' more than once",
            dup
        )));
    }

    Ok(())
}

/// Validates the lookup endpoint
fn validate_endpoint_config(config: &EndpointConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.mode.is_empty() {
        return Err(ConfigError::Validation("mode cannot be empty".to_string()));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.symbols_path.is_empty() {
        return Err(ConfigError::Validation(
            "symbols_path cannot be empty".to_string(),
        ));
    }

    if config.log_path.is_empty() {
        return Err(ConfigError::Validation(
            "log_path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.summary_path, Some(p) if p.is_empty()) {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}
