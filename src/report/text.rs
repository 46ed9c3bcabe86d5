use std::fmt::Write;

use chrono::SecondsFormat;

use super::Report;
use crate::feed::{Article, FeedResult};

const WIDTH: usize = 80;

/// Title printed for feeds that failed before a title was known.
const FAILED_FEED_TITLE: &str = "Unknown";

/// Renders `report` as the human-readable text digest.
///
/// Layout: a banner, the generation time and feed count, then one block per
/// feed. A block lists title, URL and fetch time, followed by either the
/// error or the article count and each article. Empty summaries are omitted.
pub fn render_text(report: &Report) -> String {
    let heavy = "=".repeat(WIDTH);
    let light = "-".repeat(WIDTH);
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "RSS FEEDS SUMMARY");
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(
        out,
        "Generated: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "Total feeds: {}\n", report.total_feeds);

    for feed in &report.feeds {
        let _ = writeln!(out, "{light}");
        match feed {
            FeedResult::Success(s) => {
                write_header(&mut out, &s.feed_title, &s.feed_url, feed);
                let _ = writeln!(out, "Articles: {}\n", s.article_count);
                for article in &s.articles {
                    write_article(&mut out, article);
                }
            }
            FeedResult::Failure(f) => {
                write_header(&mut out, FAILED_FEED_TITLE, &f.feed_url, feed);
                let _ = writeln!(out, "Error: {}", f.error);
            }
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{heavy}");
    out
}

fn write_header(out: &mut String, title: &str, url: &str, feed: &FeedResult) {
    let _ = writeln!(out, "Feed: {title}");
    let _ = writeln!(out, "URL: {url}");
    let _ = writeln!(
        out,
        "Fetched: {}",
        feed.fetched_at().to_rfc3339_opts(SecondsFormat::AutoSi, true)
    );
}

fn write_article(out: &mut String, article: &Article) {
    let _ = writeln!(out, "\n  Title: {}", article.title);
    let _ = writeln!(out, "  Link: {}", article.link);
    let _ = writeln!(out, "  Published: {}", article.published);
    if !article.summary.is_empty() {
        let _ = writeln!(out, "  Summary: {}", article.summary);
    }
}
