use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use feedreport::config::{Args, Config};
use feedreport::feed::HttpFeedSource;
use feedreport::run::run;
use feedreport::util::SystemClock;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Progress is logged at info; RUST_LOG overrides
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("feedreport=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not errors
            return Ok(if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            });
        }
    };

    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            let _ = Args::command().print_help();
            eprintln!("\n✗ Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    tracing::debug!(?config, "Loaded configuration");

    let source =
        HttpFeedSource::new(&config.user_agent).context("Failed to build HTTP client")?;

    let summary = match run(&config, &source, &SystemClock).await {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("✗ Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let banner = "=".repeat(80);
    println!("\n{banner}");
    if summary.is_success() {
        println!("✓ Feed loading completed successfully!");
    } else {
        println!("⚠ Feed loading completed with some errors");
    }
    if summary.failed_feeds > 0 {
        println!(
            "  {} of {} feed(s) could not be fetched",
            summary.failed_feeds, summary.total_feeds
        );
    }
    println!("{banner}");

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
