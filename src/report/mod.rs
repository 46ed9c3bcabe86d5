//! Rendering the fetched feeds as a text digest or a JSON document.
//!
//! Renderers are pure functions of a [`Report`]; the `write_*` functions
//! add the file I/O on top. Files are written in one plain `std::fs::write`
//! call, so a crash mid-write can leave a partial file.

mod json;
mod text;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feed::FeedResult;

pub use json::{parse_json, render_json};
pub use text::render_text;

/// Errors that can occur while producing an output file.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write '{}': {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything fetched in one run, in subscription order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub total_feeds: usize,
    pub feeds: Vec<FeedResult>,
}

impl Report {
    pub fn new(feeds: Vec<FeedResult>, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            total_feeds: feeds.len(),
            feeds,
        }
    }

    /// Number of feeds whose fetch failed.
    pub fn failed_feeds(&self) -> usize {
        self.feeds.iter().filter(|f| f.is_failure()).count()
    }
}

/// Writes the text digest of `report` to `path`.
pub fn write_text(report: &Report, path: &Path) -> Result<(), ReportError> {
    write_file(path, render_text(report).as_bytes())?;
    tracing::info!(path = %path.display(), "Successfully saved to TXT: {}", path.display());
    Ok(())
}

/// Writes the JSON document of `report` to `path`.
pub fn write_json(report: &Report, path: &Path) -> Result<(), ReportError> {
    let json = render_json(report)?;
    write_file(path, json.as_bytes())?;
    tracing::info!(path = %path.display(), "Successfully saved to JSON: {}", path.display());
    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), ReportError> {
    std::fs::write(path, contents).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
