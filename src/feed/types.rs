use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util::truncate_chars;

/// Maximum number of articles kept per feed.
pub const MAX_ARTICLES_PER_FEED: usize = 10;
/// Maximum summary length, in characters.
pub const MAX_SUMMARY_CHARS: usize = 200;

pub const UNKNOWN_FEED_TITLE: &str = "Unknown Feed";
pub const UNTITLED_ARTICLE: &str = "No title";

// ============================================================================
// Collaborator output
// ============================================================================

/// A feed as handed back by a [`FeedSource`](super::FeedSource), before any
/// defaults or bounds are applied.
#[derive(Debug, Clone, Default)]
pub struct RetrievedFeed {
    /// Set when the document was usable but suspicious (the "bozo" condition).
    /// Holds a human-readable reason.
    pub bozo: Option<String>,
    pub title: Option<String>,
    /// Entries in the order the source published them.
    pub entries: Vec<RetrievedEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct RetrievedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub summary: Option<String>,
}

// ============================================================================
// Normalized records
// ============================================================================

/// A single article, normalized for the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub published: String,
    /// At most [`MAX_SUMMARY_CHARS`] characters.
    pub summary: String,
}

impl Article {
    /// Builds an article, filling missing fields with their defaults and
    /// truncating the summary.
    pub fn new(
        title: Option<String>,
        link: Option<String>,
        published: Option<String>,
        summary: Option<String>,
    ) -> Self {
        let summary = summary
            .map(|s| truncate_chars(&s, MAX_SUMMARY_CHARS).into_owned())
            .unwrap_or_default();

        Self {
            title: title.unwrap_or_else(|| UNTITLED_ARTICLE.to_string()),
            link: link.unwrap_or_default(),
            published: published.unwrap_or_default(),
            summary,
        }
    }
}

impl From<RetrievedEntry> for Article {
    fn from(entry: RetrievedEntry) -> Self {
        Article::new(entry.title, entry.link, entry.published, entry.summary)
    }
}

/// Successfully fetched feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSuccess {
    pub feed_url: String,
    pub feed_title: String,
    pub article_count: usize,
    pub articles: Vec<Article>,
    pub fetched_at: DateTime<Utc>,
}

/// Feed whose retrieval failed. Never carries articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFailure {
    pub feed_url: String,
    pub error: String,
    pub fetched_at: DateTime<Utc>,
}

/// Outcome of fetching one subscription.
///
/// Serialized untagged: the variant is recognized by its fields (`error`
/// versus `feed_title`/`articles`), which is the report's JSON contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedResult {
    Success(FeedSuccess),
    Failure(FeedFailure),
}

impl FeedResult {
    /// Builds a success record. Keeps the first [`MAX_ARTICLES_PER_FEED`]
    /// articles and defaults a missing title to "Unknown Feed".
    pub fn success(
        feed_url: impl Into<String>,
        feed_title: Option<String>,
        articles: impl IntoIterator<Item = Article>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let articles: Vec<Article> = articles.into_iter().take(MAX_ARTICLES_PER_FEED).collect();
        FeedResult::Success(FeedSuccess {
            feed_url: feed_url.into(),
            feed_title: feed_title.unwrap_or_else(|| UNKNOWN_FEED_TITLE.to_string()),
            article_count: articles.len(),
            articles,
            fetched_at,
        })
    }

    /// Builds a failure record. An empty message is replaced so the record
    /// always explains itself.
    pub fn failure(
        feed_url: impl Into<String>,
        error: impl Into<String>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "unknown error".to_string();
        }
        FeedResult::Failure(FeedFailure {
            feed_url: feed_url.into(),
            error,
            fetched_at,
        })
    }

    pub fn feed_url(&self) -> &str {
        match self {
            FeedResult::Success(s) => &s.feed_url,
            FeedResult::Failure(f) => &f.feed_url,
        }
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        match self {
            FeedResult::Success(s) => s.fetched_at,
            FeedResult::Failure(f) => f.fetched_at,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FeedResult::Failure(_))
    }
}
