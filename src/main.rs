//! Tube-Harvest main entry point
//!
//! This is the command-line interface for the Tube-Harvest video harvester.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tube_harvest::config::{load_config_with_hash, Config, RendererKind};
use tube_harvest::crawler::run_crawl;
use tube_harvest::output::{load_statistics, print_statistics, stats::RECENT_LIMIT};
use tube_harvest::storage::open_store;

/// Tube-Harvest: a random-walk video harvester
///
/// Tube-Harvest keeps rendering a video platform's landing page, picks one
/// unseen video per pass, and stores its metadata and captions in SQLite.
/// It runs until interrupted with Ctrl-C.
#[derive(Parser, Debug)]
#[command(name = "tube-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A random-walk video metadata and caption harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and print the resolved settings without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tube_harvest=info,warn"),
            1 => EnvFilter::new("tube_harvest=debug,info"),
            2 => EnvFilter::new("tube_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: prints the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Tube-Harvest Dry Run ===\n");

    println!("Crawler:");
    println!("  Landing URL: {}", config.crawler.landing_url);
    println!("  Max concurrent videos: {}", config.crawler.max_concurrent_videos);
    println!("  Queue capacity: {}", config.crawler.queue_capacity);
    println!(
        "  Min discovery interval: {}ms",
        config.crawler.min_discovery_interval
    );
    println!(
        "  Shutdown grace period: {}ms",
        config.crawler.shutdown_grace_period
    );

    println!("\nRenderer:");
    match config.renderer.kind {
        RendererKind::Browserless => println!(
            "  Browserless at {}{}",
            config.renderer.endpoint.as_deref().unwrap_or("-"),
            if config.renderer.token.is_some() {
                " (token set)"
            } else {
                ""
            }
        ),
        RendererKind::Http => println!("  Plain HTTP (no script execution)"),
    }
    println!("  Settle time: {}ms", config.renderer.settle_time);
    if let Some(selector) = &config.renderer.settle_selector {
        println!("  Settle selector: {}", selector);
    }

    println!("\nPlatform:");
    println!("  Base URL: {}", config.platform.base_url);
    if config.platform.transcript_languages.is_empty() {
        println!("  Transcript languages: any");
    } else {
        println!(
            "  Transcript languages: {}",
            config.platform.transcript_languages.join(", ")
        );
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_store(Path::new(&config.output.database_path))
        .context("Failed to open record store")?;
    let stats = load_statistics(&store, RECENT_LIMIT)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation; Ctrl-C requests a clean shutdown
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, stopping crawl");
                signal_token.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    match run_crawl(config, shutdown).await {
        Ok(snapshot) => {
            tracing::info!("Crawl finished: {} videos stored", snapshot.stored);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
