//! Ticker-Sweep main entry point
//!
//! This is the command-line interface for the Ticker-Sweep symbol harvester.

use clap::Parser;
use std::path::{Path, PathBuf};
use ticker_sweep::config::{load_config_with_hash, validate, Config};
use ticker_sweep::crawler::{crawl, plan_blocks, Alphabet};
use ticker_sweep::output::print_report;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Ticker-Sweep: an exhaustive ticker symbol harvester
///
/// Ticker-Sweep enumerates short alphanumeric prefixes against a paginated
/// lookup service, pages through every result window, and refines prefixes
/// whose results are truncated. The union of all symbols is written to a
/// text file, one per line.
#[derive(Parser, Debug)]
#[command(name = "ticker-sweep")]
#[command(version = "1.0.0")]
#[command(about = "An exhaustive ticker symbol harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write the symbol list to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also write a markdown summary to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Longest prefix a saturated term may be refined to
    #[arg(long, value_name = "N")]
    max_prefix_length: Option<usize>,

    /// Validate config and show the sweep plan without touching the network
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, config_hash) = match load_config_with_hash(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let config = apply_overrides(config, &cli)?;

    // Keep the guard alive so buffered file records are flushed on exit
    let _guard = setup_logging(cli.verbose, cli.quiet, Path::new(&config.output.log_path))?;

    match &cli.config {
        Some(path) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            config_hash
        ),
        None => tracing::info!("Using default configuration"),
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(&config, &config_hash).await?;
    }

    Ok(())
}

/// Applies command-line overrides and re-validates the result
fn apply_overrides(mut config: Config, cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    if let Some(output) = &cli.output {
        config.output.symbols_path = output.display().to_string();
    }
    if let Some(summary) = &cli.summary {
        config.output.summary_path = Some(summary.display().to_string());
    }
    if let Some(max_prefix_length) = cli.max_prefix_length {
        config.crawl.max_prefix_length = max_prefix_length;
    }

    validate(&config)?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber
///
/// Records go to stderr and are appended to `log_path`. The filter follows
/// the verbosity flags unless `RUST_LOG` is set.
fn setup_logging(
    verbose: u8,
    quiet: bool,
    log_path: &Path,
) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            // Only show errors
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("ticker_sweep=info,warn"),
                1 => EnvFilter::new("ticker_sweep=debug,info"),
                2 => EnvFilter::new("ticker_sweep=trace,debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = log_path
        .file_name()
        .ok_or_else(|| format!("Invalid log path: {}", log_path.display()))?;
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()?;

    Ok(guard)
}

/// Handles the --dry-run mode: validates config and shows the sweep plan
fn handle_dry_run(config: &Config) {
    let alphabet = Alphabet::from_config(&config.crawl);
    let prefixes = alphabet.prefix_count(config.crawl.prefix_length);
    let saturated_blocks = plan_blocks(
        config.crawl.window_cap,
        config.crawl.window_cap,
        config.crawl.block_size,
        config.crawl.probe_size,
    )
    .len();

    println!("=== Ticker-Sweep Dry Run ===\n");

    println!("Sweep Configuration:");
    println!("  Alphabet: {} ({} characters)", config.crawl.alphabet, alphabet.len());
    println!("  Base prefix length: {}", config.crawl.prefix_length);
    println!("  Base prefixes: {}", prefixes);
    println!("  Max prefix length: {}", config.crawl.max_prefix_length);
    println!("  Result window: {} rows", config.crawl.window_cap);
    println!(
        "  Probe size: {}, block size: {} ({} blocks per saturated term)",
        config.crawl.probe_size, config.crawl.block_size, saturated_blocks
    );
    println!(
        "  Retries: {} attempts, {}ms apart",
        config.crawl.max_attempts, config.crawl.retry_delay_ms
    );
    println!(
        "  Max concurrent blocks: {}",
        config.crawl.max_concurrent_blocks
    );

    println!("\nEndpoint:");
    println!("  Base URL: {}", config.endpoint.base_url);
    println!("  Mode: {}", config.endpoint.mode);
    println!("  User agent: {}", config.endpoint.user_agent);
    println!(
        "  Timeouts: {}s request, {}s connect",
        config.endpoint.timeout_secs, config.endpoint.connect_timeout_secs
    );

    println!("\nOutput:");
    println!("  Symbols: {}", config.output.symbols_path);
    println!("  Log: {}", config.output.log_path);
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would probe {} base prefixes", prefixes);
}

/// Handles the main sweep operation
async fn handle_crawl(config: &Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Sweeping {} against {}",
        config.crawl.alphabet,
        config.endpoint.base_url
    );

    match crawl(config, config_hash).await {
        Ok(harvest) => {
            tracing::info!("Sweep completed successfully");
            print_report(&harvest.report);
            println!(
                "\nTotal: {} symbols written to {}",
                harvest.symbols.len(),
                config.output.symbols_path
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Sweep failed: {}", e);
            Err(e.into())
        }
    }
}
