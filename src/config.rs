//! Command-line configuration.
//!
//! There is no config file: everything comes from arguments, with
//! environment variable fallbacks for the timeout and user agent.
//! [`Args`] is the raw clap surface; [`Config`] is the validated form the
//! run coordinator consumes.
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Please specify at least one output format (--txt, --json, or --both)")]
    NoOutputFormat,
}

// ============================================================================
// Command line
// ============================================================================

#[derive(Parser, Debug, Clone)]
#[command(
    name = "feedreport",
    version,
    about = "Load RSS feeds from an OPML file and export them to TXT or JSON",
    after_help = "Examples:
  feedreport subscriptions.opml --txt output.txt
  feedreport subscriptions.opml --json output.json
  feedreport subscriptions.opml --both output"
)]
pub struct Args {
    /// Path to OPML subscription file
    #[arg(value_name = "OPML_FILE")]
    pub opml_file: PathBuf,

    /// Output file for TXT format
    #[arg(long, value_name = "FILE")]
    pub txt: Option<PathBuf>,

    /// Output file for JSON format
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Save both formats with given prefix (.txt and .json will be added)
    #[arg(long, value_name = "PREFIX")]
    pub both: Option<OsString>,

    /// Timeout in seconds for each feed request
    #[arg(
        long,
        value_name = "SECONDS",
        env = "FEEDREPORT_TIMEOUT",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// User-Agent header sent with feed requests
    #[arg(long, value_name = "AGENT", env = "FEEDREPORT_USER_AGENT")]
    pub user_agent: Option<String>,
}

// ============================================================================
// Validated configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("TXT"),
            OutputFormat::Json => f.write_str("JSON"),
        }
    }
}

/// One file to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub format: OutputFormat,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub opml_path: PathBuf,
    /// Written in this order; never empty.
    pub outputs: Vec<OutputTarget>,
    /// Per-feed request timeout.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Config {
    /// Validates parsed arguments.
    ///
    /// `--both PREFIX` takes precedence over `--txt`/`--json` and expands to
    /// `PREFIX.txt` then `PREFIX.json`. Otherwise text is written before JSON.
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let outputs = match args.both {
            Some(prefix) => {
                if args.txt.is_some() || args.json.is_some() {
                    tracing::warn!("--both given, ignoring --txt/--json");
                }
                vec![
                    OutputTarget {
                        format: OutputFormat::Text,
                        path: with_suffix(&prefix, ".txt"),
                    },
                    OutputTarget {
                        format: OutputFormat::Json,
                        path: with_suffix(&prefix, ".json"),
                    },
                ]
            }
            None => {
                let text = args.txt.map(|path| OutputTarget {
                    format: OutputFormat::Text,
                    path,
                });
                let json = args.json.map(|path| OutputTarget {
                    format: OutputFormat::Json,
                    path,
                });
                text.into_iter().chain(json).collect()
            }
        };

        if outputs.is_empty() {
            return Err(ConfigError::NoOutputFormat);
        }

        Ok(Self {
            opml_path: args.opml_file,
            outputs,
            timeout: Duration::from_secs(args.timeout),
            user_agent: args.user_agent.unwrap_or_else(default_user_agent),
        })
    }
}

pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn with_suffix(prefix: &OsString, suffix: &str) -> PathBuf {
    let mut path = prefix.clone();
    path.push(suffix);
    PathBuf::from(path)
}

// ============================================================================
// Tests
// ============================================================================
