use std::time::Duration;

use futures::stream::{self, StreamExt};

use super::source::FeedSource;
use super::types::{Article, FeedResult, MAX_ARTICLES_PER_FEED};
use crate::util::Clock;

/// Fetches every feed in `urls`, one at a time, in order.
///
/// Never fails: each URL yields exactly one [`FeedResult`], either a
/// success or a failure carrying the error message, and a failing feed
/// does not stop the ones after it.
///
/// # Behavior
///
/// - Feeds are fetched strictly sequentially; the next request starts only
///   after the previous result is recorded
/// - No retries: a failed request is reported as-is
/// - A bozo feed is logged as a warning and still extracted
/// - Each result is stamped with `clock.now()` when it is produced
pub async fn fetch_all<S, C>(
    source: &S,
    clock: &C,
    urls: &[String],
    timeout: Duration,
) -> Vec<FeedResult>
where
    S: FeedSource + Sync + ?Sized,
    C: Clock + ?Sized,
{
    let total = urls.len();
    tracing::info!(
        feeds = total,
        timeout_secs = timeout.as_secs(),
        "Fetching feeds (timeout: {}s)",
        timeout.as_secs()
    );

    // `then` awaits each future before polling the next item
    stream::iter(urls.iter().enumerate())
        .then(|(idx, url)| fetch_one(source, clock, url, idx + 1, total, timeout))
        .collect()
        .await
}

async fn fetch_one<S, C>(
    source: &S,
    clock: &C,
    url: &str,
    position: usize,
    total: usize,
    timeout: Duration,
) -> FeedResult
where
    S: FeedSource + Sync + ?Sized,
    C: Clock + ?Sized,
{
    tracing::info!(url = %url, "[{}/{}] Fetching: {}", position, total, url);

    match source.fetch(url, timeout).await {
        Ok(feed) => {
            if let Some(reason) = &feed.bozo {
                tracing::warn!(url = %url, reason = %reason, "Feed parsing had issues");
            }

            let articles = feed
                .entries
                .into_iter()
                .take(MAX_ARTICLES_PER_FEED)
                .map(Article::from);
            let result = FeedResult::success(url, feed.title, articles, clock.now());

            if let FeedResult::Success(success) = &result {
                tracing::info!(
                    url = %url,
                    articles = success.article_count,
                    "Successfully fetched {} article(s)",
                    success.article_count
                );
            }
            result
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Failed to fetch");
            FeedResult::failure(url, e.to_string(), clock.now())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::source::FetchError;
    use crate::feed::types::{RetrievedEntry, RetrievedFeed, MAX_SUMMARY_CHARS};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    /// In-memory source: URLs not in the map fail with a parse error.
    #[derive(Default)]
    struct StubSource {
        feeds: HashMap<String, RetrievedFeed>,
        calls: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn with(mut self, url: &str, feed: RetrievedFeed) -> Self {
            self.feeds.insert(url.to_string(), feed);
            self
        }
    }

    #[async_trait]
    impl FeedSource for StubSource {
        async fn fetch(&self, url: &str, _timeout: Duration) -> Result<RetrievedFeed, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            self.feeds
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Parse(format!("no feed at {url}")))
        }
    }

    /// Advances one second per call.
    struct StepClock(AtomicI64);

    impl StepClock {
        fn new() -> Self {
            Self(AtomicI64::new(0))
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            let step = self.0.fetch_add(1, Ordering::SeqCst);
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(step)
        }
    }

    fn entries(n: usize) -> Vec<RetrievedEntry> {
        (0..n)
            .map(|i| RetrievedEntry {
                title: Some(format!("Entry {i}")),
                link: Some(format!("https://example.com/{i}")),
                published: None,
                summary: Some("x".repeat(300)),
            })
            .collect()
    }

    fn feed(title: Option<&str>, n: usize) -> RetrievedFeed {
        RetrievedFeed {
            bozo: None,
            title: title.map(String::from),
            entries: entries(n),
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let source = StubSource::default()
            .with("https://a.example.com/feed", feed(Some("A"), 2))
            .with("https://c.example.com/feed", feed(Some("C"), 1));
        let urls: Vec<String> = ["a", "b", "c"]
            .iter()
            .map(|h| format!("https://{h}.example.com/feed"))
            .collect();

        let results = fetch_all(&source, &StepClock::new(), &urls, TIMEOUT).await;

        assert_eq!(results.len(), 3);
        assert!(!results[0].is_failure());
        assert!(!results[2].is_failure());
        match &results[1] {
            FeedResult::Failure(f) => {
                assert_eq!(f.feed_url, "https://b.example.com/feed");
                assert!(f.error.contains("no feed at"));
            }
            FeedResult::Success(_) => panic!("expected failure"),
        }
        assert_eq!(*source.calls.lock().unwrap(), urls);
    }

    #[tokio::test]
    async fn test_bounds_and_defaults() {
        let source = StubSource::default().with("https://x.example.com/", feed(None, 12));
        let urls = vec!["https://x.example.com/".to_string()];

        let results = fetch_all(&source, &StepClock::new(), &urls, TIMEOUT).await;

        let FeedResult::Success(success) = &results[0] else {
            panic!("expected success");
        };
        assert_eq!(success.feed_title, "Unknown Feed");
        assert_eq!(success.article_count, 10);
        assert_eq!(success.articles.len(), 10);
        assert_eq!(success.articles[0].title, "Entry 0");
        assert_eq!(success.articles[9].title, "Entry 9");
        assert!(success
            .articles
            .iter()
            .all(|a| a.summary.chars().count() == MAX_SUMMARY_CHARS));
        assert!(success.articles.iter().all(|a| a.published.is_empty()));
    }

    #[tokio::test]
    async fn test_bozo_feed_still_extracted() {
        let mut bozo = feed(Some("Bozo"), 3);
        bozo.bozo = Some("text/html is not an XML media type".into());
        let source = StubSource::default().with("https://bozo.example.com/", bozo);

        let results = fetch_all(
            &source,
            &StepClock::new(),
            &["https://bozo.example.com/".to_string()],
            TIMEOUT,
        )
        .await;

        match &results[0] {
            FeedResult::Success(s) => {
                assert_eq!(s.feed_title, "Bozo");
                assert_eq!(s.article_count, 3);
            }
            FeedResult::Failure(f) => panic!("unexpected failure: {}", f.error),
        }
    }

    #[tokio::test]
    async fn test_each_result_gets_its_own_timestamp() {
        let source = StubSource::default().with("https://a.example.com/", feed(None, 0));
        let urls = vec![
            "https://a.example.com/".to_string(),
            "https://missing.example.com/".to_string(),
        ];

        let results = fetch_all(&source, &StepClock::new(), &urls, TIMEOUT).await;

        assert!(results[0].fetched_at() < results[1].fetched_at());
    }

    #[tokio::test]
    async fn test_empty_input() {
        let results = fetch_all(&StubSource::default(), &StepClock::new(), &[], TIMEOUT).await;
        assert!(results.is_empty());
    }

    proptest! {
        #[test]
        fn results_follow_input_order(
            picks in proptest::collection::vec((0usize..6, any::<bool>()), 0..20)
        ) {
            let mut source = StubSource::default();
            let mut urls = Vec::new();
            for (i, (host, ok)) in picks.iter().enumerate() {
                let url = format!("https://h{host}.example.com/{i}");
                if *ok {
                    source = source.with(&url, feed(Some("T"), i));
                }
                urls.push(url);
            }

            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let results = rt.block_on(fetch_all(&source, &StepClock::new(), &urls, TIMEOUT));

            prop_assert_eq!(results.len(), urls.len());
            for (result, url) in results.iter().zip(&urls) {
                prop_assert_eq!(result.feed_url(), url.as_str());
                if let FeedResult::Success(s) = result {
                    prop_assert!(s.articles.len() <= MAX_ARTICLES_PER_FEED);
                    prop_assert_eq!(s.article_count, s.articles.len());
                }
            }
        }
    }
}
