//! Run coordination: parse, fetch, write.
//!
//! Ingestion is best-effort and output is not. A broken OPML file aborts the
//! run, a broken feed only becomes a failure record, and any failed write
//! makes the run unsuccessful without stopping the remaining writes.

use thiserror::Error;

use crate::config::{Config, OutputFormat, OutputTarget};
use crate::feed::{self, FeedSource, OpmlError};
use crate::report::{self, Report, ReportError};
use crate::util::Clock;

/// Errors that abort a run before any output is written.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Opml(#[from] OpmlError),
}

/// Result of attempting one output file.
#[derive(Debug)]
pub struct WriteOutcome {
    pub target: OutputTarget,
    pub result: Result<(), ReportError>,
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub total_feeds: usize,
    pub failed_feeds: usize,
    pub writes: Vec<WriteOutcome>,
}

impl RunSummary {
    /// True when every requested output was written. Failed feeds don't count.
    pub fn is_success(&self) -> bool {
        self.writes.iter().all(|w| w.result.is_ok())
    }
}

/// Runs one fetch-and-report pass.
///
/// # Errors
///
/// Returns [`RunError::Opml`] if the subscription file is missing or
/// unparseable; nothing is fetched or written in that case. All other
/// problems are reported through the returned [`RunSummary`].
pub async fn run<S, C>(config: &Config, source: &S, clock: &C) -> Result<RunSummary, RunError>
where
    S: FeedSource + Sync + ?Sized,
    C: Clock + ?Sized,
{
    let urls = feed::parse(&config.opml_path).await?;
    if urls.is_empty() {
        tracing::warn!(path = %config.opml_path.display(), "No RSS feeds found in OPML file");
    }

    let results = feed::fetch_all(source, clock, &urls, config.timeout).await;
    let report = Report::new(results, clock.now());

    let writes = config
        .outputs
        .iter()
        .map(|target| {
            let result = write_output(&report, target);
            if let Err(e) = &result {
                tracing::error!(
                    format = %target.format,
                    path = %target.path.display(),
                    error = %e,
                    "Error saving {} file",
                    target.format
                );
            }
            WriteOutcome {
                target: target.clone(),
                result,
            }
        })
        .collect();

    Ok(RunSummary {
        total_feeds: report.total_feeds,
        failed_feeds: report.failed_feeds(),
        writes,
    })
}

fn write_output(report: &Report, target: &OutputTarget) -> Result<(), ReportError> {
    match target.format {
        OutputFormat::Text => report::write_text(report, &target.path),
        OutputFormat::Json => report::write_json(report, &target.path),
    }
}
