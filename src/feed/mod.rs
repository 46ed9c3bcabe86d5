//! Feed ingestion: OPML subscriptions in, one normalized record per feed out.
//!
//! - [`opml`] - extracts the `type="rss"` subscription URLs from an OPML file
//! - [`source`] - the [`FeedSource`] seam and its HTTP implementation
//! - [`parser`] - RSS/Atom parsing using the `feed-rs` crate
//! - [`fetcher`] - sequential fetching with per-feed failure isolation
//! - [`types`] - [`FeedResult`] and [`Article`], where defaults and bounds live
//!
//! # Example
//!
//! ```ignore
//! use feedreport::feed::{fetch_all, parse, HttpFeedSource};
//! use feedreport::util::SystemClock;
//!
//! let urls = parse(Path::new("subscriptions.opml")).await?;
//! let source = HttpFeedSource::new("feedreport")?;
//! let results = fetch_all(&source, &SystemClock, &urls, Duration::from_secs(10)).await;
//! ```

mod fetcher;
mod opml;
mod parser;
mod source;
mod types;

pub use fetcher::fetch_all;
pub use opml::{parse, parse_opml_content, OpmlError};
pub use parser::parse_feed;
pub use source::{FeedSource, FetchError, HttpFeedSource};
pub use types::{
    Article, FeedFailure, FeedResult, FeedSuccess, RetrievedEntry, RetrievedFeed,
    MAX_ARTICLES_PER_FEED, MAX_SUMMARY_CHARS, UNKNOWN_FEED_TITLE, UNTITLED_ARTICLE,
};
