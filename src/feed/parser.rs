use feed_rs::model::{Entry, Link};
use feed_rs::parser::{self, ParseFeedError};

use super::types::{RetrievedEntry, RetrievedFeed};

/// Parses RSS, Atom or JSON Feed bytes into a [`RetrievedFeed`].
///
/// Entries keep the order of the document. The bozo flag is left unset;
/// transport-level checks decide that.
pub fn parse_feed(bytes: &[u8]) -> Result<RetrievedFeed, ParseFeedError> {
    let feed = parser::parse(bytes)?;

    Ok(RetrievedFeed {
        bozo: None,
        title: feed.title.map(|t| t.content),
        entries: feed.entries.into_iter().map(entry_from_model).collect(),
    })
}

fn entry_from_model(entry: Entry) -> RetrievedEntry {
    let link = primary_link(&entry.links).map(|l| l.href.clone());
    let published = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.to_rfc3339());
    let summary = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body));

    RetrievedEntry {
        title: entry.title.map(|t| t.content),
        link,
        published,
        summary,
    }
}

/// Prefers the `alternate` link (or one with no `rel`), falling back to the first.
fn primary_link(links: &[Link]) -> Option<&Link> {
    links
        .iter()
        .find(|l| l.rel.as_deref().map_or(true, |rel| rel == "alternate"))
        .or_else(|| links.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Example Channel</title>
    <link>https://example.com</link>
    <item>
        <title>First</title>
        <link>https://example.com/first</link>
        <pubDate>Mon, 01 Jan 2024 00:00:00 +0000</pubDate>
        <description>First summary</description>
    </item>
    <item>
        <link>https://example.com/second</link>
    </item>
</channel></rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Example</title>
  <id>urn:example</id>
  <updated>2024-02-01T10:00:00Z</updated>
  <entry>
    <title>Atom entry</title>
    <id>urn:example:1</id>
    <link rel="self" href="https://example.com/self"/>
    <link rel="alternate" href="https://example.com/atom-entry"/>
    <updated>2024-02-01T10:00:00Z</updated>
    <content type="text">Body only</content>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss() {
        let feed = parse_feed(RSS.as_bytes()).unwrap();
        assert!(feed.bozo.is_none());
        assert_eq!(feed.title.as_deref(), Some("Example Channel"));
        assert_eq!(feed.entries.len(), 2);

        let first = &feed.entries[0];
        assert_eq!(first.title.as_deref(), Some("First"));
        assert_eq!(first.link.as_deref(), Some("https://example.com/first"));
        assert_eq!(first.published.as_deref(), Some("2024-01-01T00:00:00+00:00"));
        assert_eq!(first.summary.as_deref(), Some("First summary"));

        let second = &feed.entries[1];
        assert!(second.title.is_none());
        assert!(second.published.is_none());
        assert!(second.summary.is_none());
    }

    #[test]
    fn test_parse_atom_prefers_alternate_and_content() {
        let feed = parse_feed(ATOM.as_bytes()).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Atom Example"));

        let entry = &feed.entries[0];
        assert_eq!(entry.link.as_deref(), Some("https://example.com/atom-entry"));
        assert_eq!(entry.published.as_deref(), Some("2024-02-01T10:00:00+00:00"));
        assert_eq!(entry.summary.as_deref(), Some("Body only"));
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_feed(b"<not valid xml").is_err());
        assert!(parse_feed(b"").is_err());
    }
}
