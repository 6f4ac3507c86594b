//! Wayback-Robots main entry point
//!
//! This is the command-line interface for the Wayback Machine robots.txt downloader.

use anyhow::Context;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wayback_robots::archive::{retrieve, RunRequest};
use wayback_robots::config::{load_config, validate, Config};
use wayback_robots::output::{print_report, ConsoleSink, ProgressSink, RunReport, Verbosity};
use wayback_robots::ArchiveError;

const BANNER: &str = r#"
 __      __              _                _
 \ \    / /_ _ _  _ ___ | |__  __ _  __| |__
  \ \/\/ / _` | || |___|| '_ \/ _` |/ _| / /
   \_/\_/\__,_|\_, |    |_.__/\__,_|\__|_\_\  robots.txt
               |__/
"#;

/// Wayback-Robots: historical robots.txt retrieval for recon
///
/// Downloads every archived robots.txt of a domain from the Wayback Machine and
/// merges the distinct lines into one file.
#[derive(Parser, Debug)]
#[command(name = "wayback-robots")]
#[command(version)]
#[command(about = "Download robots.txt history from the Wayback Machine", long_about = None)]
#[command(
    after_help = "TS generator: https://web.archive.org/cdx/search/cdx?url=target.com/robots.txt&fl=timestamp&limit=5"
)]
struct Cli {
    /// The domain to retrieve robots.txt for
    #[arg(short = 'u', long = "url", value_name = "DOMAIN")]
    url: Option<String>,

    /// Limit on the number of timestamps to retrieve [default: 10]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    limit: Option<u32>,

    /// Path to a custom ts.log file with timestamps
    #[arg(short, long, value_name = "FILE")]
    tslog: Option<PathBuf>,

    /// Enable verbose mode
    #[arg(short, long)]
    verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Timeout for each download attempt in seconds [default: 5]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Pause between snapshot downloads in seconds [default: 0]
    #[arg(long, value_name = "SECS")]
    delay: Option<u64>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Folder receiving one sub-folder per domain [default: robots.txt]
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let Some(domain) = cli.url.clone() else {
        println!("{}", BANNER);
        println!("A Wayback Machine robots.txt downloader for recon.\n");
        Cli::command().print_help()?;
        return Ok(());
    };

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    let verbosity = Verbosity::from_flag(cli.verbose);
    let sink: Arc<dyn ProgressSink> = Arc::new(ConsoleSink::new(verbosity));

    let mut request = RunRequest::new(domain, config.archive.limit);
    if let Some(tslog) = &cli.tslog {
        request = request.with_timestamps_file(tslog);
    }

    match retrieve(&config, &request, sink).await {
        Ok(report) => {
            if !cli.quiet {
                print_report(&report, verbosity)?;
            }
            if cli.verbose {
                echo_merged(&report)?;
            }
            Ok(())
        }
        Err(ArchiveError::NoSnapshots) => {
            tracing::error!("{}", ArchiveError::NoSnapshots);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("wayback_robots=debug,info")
    } else {
        EnvFilter::new("wayback_robots=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(limit) = cli.limit {
        config.archive.limit = limit;
    }
    if let Some(timeout) = cli.timeout {
        config.fetch.timeout_secs = timeout;
    }
    if let Some(delay) = cli.delay {
        config.fetch.delay_secs = delay;
    }
    if let Some(output) = &cli.output {
        config.output.root = output.clone();
    }

    validate(&config)?;
    Ok(config)
}

/// Prints the merged file, as verbose mode promises
fn echo_merged(report: &RunReport) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&report.merged.path)
        .with_context(|| format!("Failed to read {}", report.merged.path.display()))?;
    println!("\nContent of {}:", report.merged.path.display());
    print!("{}", content);
    Ok(())
}
