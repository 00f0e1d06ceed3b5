//! Fetch, decode, normalize and aggregate every configured source.

use crate::aggregate::Collection;
use crate::feeds::decode::decode;
use crate::feeds::normalize::normalize;
use crate::fetch::{fetch_all, FeedFetcher};
use tracing::{info, instrument};
use url::Url;

/// Build the deduplicated collection for one run.
///
/// Fetches run concurrently; their outcomes are then folded into the
/// collection one at a time, in completion order. A failed source is treated
/// as an empty body and contributes nothing.
#[instrument(level = "info", skip_all)]
pub async fn aggregate_feeds<F>(fetcher: &F, sources: &[Url], max_in_flight: usize) -> Collection
where
    F: FeedFetcher,
{
    let outcomes = fetch_all(fetcher, sources, max_in_flight).await;
    let mut collection = Collection::new();

    for outcome in outcomes {
        // already logged by fetch_all
        let body = outcome.result.unwrap_or_default();
        let doc = decode(&body);
        let shape = doc.shape();
        let added = normalize(doc, &mut collection);
        info!(
            source = %outcome.source,
            shape,
            added,
            bytes = body.len(),
            fetch_elapsed = ?outcome.elapsed,
            "Aggregated source"
        );
    }

    info!(count = collection.len(), "Aggregation complete");
    collection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::StubFetcher;

    const GAMESPOT: &str = r#"<rss version="2.0"><channel><title>GameSpot</title>
        <item><title>Shared headline</title><link>https://gamespot.example/1</link><description>From GameSpot</description></item>
        <item><title>GameSpot only</title><link>https://gamespot.example/2</link><description>Second</description></item>
    </channel></rss>"#;

    const IGN: &str = r#"<rss version="2.0"><channel><title>IGN</title>
        <item><title>IGN only</title><link>https://ign.example/1</link><description>From IGN</description></item>
    </channel></rss>"#;

    const POLYGON: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>Polygon</title>
        <entry>
          <title>Shared headline</title>
          <link rel="alternate" href="https://polygon.example/shared"/>
          <content type="html">&lt;p&gt;dup&lt;/p&gt;</content>
        </entry>
        <entry>
          <title>Polygon only</title>
          <link rel="alternate" href="https://polygon.example/p"/>
          <content type="html">&lt;img src="https://img.example/p.jpg"/&gt;&lt;p&gt;Summary&lt;/p&gt;&lt;p&gt;&lt;a href="https://polygon.example/p"&gt;Continue&lt;/a&gt;&lt;/p&gt;</content>
        </entry>
    </feed>"#;

    fn sources(urls: &[&str]) -> Vec<Url> {
        urls.iter().map(|u| Url::parse(u).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_failed_source_does_not_affect_others() {
        let fetcher = StubFetcher::default()
            .with("https://gamespot.example/feed", 0, GAMESPOT)
            .with("https://ign.example/feed", 0, IGN);
        let urls = sources(&[
            "https://gamespot.example/feed",
            "https://ign.example/feed",
            "https://polygon.example/feed",
        ]);

        let collection = aggregate_feeds(&fetcher, &urls, 0).await;
        assert_eq!(collection.len(), 3);

        let mut titles: Vec<_> = collection.iter().map(|r| r.title.clone()).collect();
        titles.sort();
        assert_eq!(titles, ["GameSpot only", "IGN only", "Shared headline"]);
    }

    #[tokio::test]
    async fn test_duplicates_across_sources_keep_first_completed() {
        // GameSpot completes first, so its copy of the shared headline wins
        let fetcher = StubFetcher::default()
            .with("https://gamespot.example/feed", 0, GAMESPOT)
            .with("https://polygon.example/feed", 100, POLYGON);
        let urls = sources(&["https://polygon.example/feed", "https://gamespot.example/feed"]);

        let records = aggregate_feeds(&fetcher, &urls, 0).await.into_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].title, "Shared headline");
        assert_eq!(records[0].description, "From GameSpot");
        assert_eq!(records[2].title, "Polygon only");
        assert_eq!(
            records[2].description,
            "Summary\nImage source: https://img.example/p.jpg\nRead more: https://polygon.example/p"
        );
        assert_eq!(records[2].url, "https://polygon.example/p");
    }

    #[tokio::test]
    async fn test_extension_elements_do_not_drop_source() {
        let ign_with_media = r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:media="http://search.yahoo.com/mrss/">
          <channel><title>IGN</title>
            <item><title>With extras</title><link>https://ign.example/x</link><atom:link href="https://ign.example/x/amp"/>
              <media:title>Media headline</media:title><description>From IGN</description></item>
            <item><title>Plain</title><link>https://ign.example/y</link><description>Second</description></item>
          </channel></rss>"#;
        let fetcher = StubFetcher::default().with("https://ign.example/feed", 0, ign_with_media);
        let urls = sources(&["https://ign.example/feed"]);

        let records = aggregate_feeds(&fetcher, &urls, 0).await.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], crate::models::NormalizedRecord::new("With extras", "https://ign.example/x", "From IGN"));
    }

    #[tokio::test]
    async fn test_garbage_body_contributes_nothing() {
        let fetcher = StubFetcher::default()
            .with("https://ign.example/feed", 0, IGN)
            .with("https://broken.example/feed", 0, "<html><body>Service unavailable");
        let urls = sources(&["https://ign.example/feed", "https://broken.example/feed"]);

        let collection = aggregate_feeds(&fetcher, &urls, 0).await;
        assert_eq!(collection.len(), 1);
    }
}
