//! Concurrent retrieval of raw feed bodies.
//!
//! # Architecture
//!
//! - [`FeedFetcher`]: the retrieval seam, one URL in, bytes or a [`FetchError`] out
//! - [`HttpFetcher`]: the reqwest implementation, with a per-request timeout
//! - [`fetch_all`]: issues one retrieval per source and collects every outcome
//!
//! A failed source never affects the others. Each outcome carries its source
//! URL; outcomes arrive in completion order, not in source order.

use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, instrument};
use url::Url;

/// Sent with every request; some feed hosts reject the default client string.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Why a source produced no body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl FetchError {
    fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout { url: url.to_string() }
        } else if let Some(status) = e.status() {
            FetchError::Status {
                url: url.to_string(),
                status,
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: e,
            }
        }
    }
}

/// Retrieves the raw body behind a feed URL.
pub trait FeedFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`FeedFetcher`] over a shared reqwest [`Client`].
///
/// Non-2xx responses and timeouts are failures, not empty bodies.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

impl FeedFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        Ok(body.to_vec())
    }
}

/// Result of retrieving one source.
#[derive(Debug)]
pub struct FetchOutcome {
    pub source: Url,
    pub result: Result<Vec<u8>, FetchError>,
    pub elapsed: Duration,
}

/// Retrieve every source concurrently and wait for all of them.
///
/// At most `max_in_flight` requests run at once (`0` means one per source).
/// Outcomes are returned in the order they completed.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn fetch_all<F>(fetcher: &F, sources: &[Url], max_in_flight: usize) -> Vec<FetchOutcome>
where
    F: FeedFetcher,
{
    let limit = match max_in_flight {
        0 => sources.len().max(1),
        n => n,
    };

    let outcomes: Vec<FetchOutcome> = stream::iter(sources.iter().cloned())
        .map(|source| async move {
            let t0 = Instant::now();
            let result = fetcher.get(source.as_str()).await;
            let elapsed = t0.elapsed();
            match &result {
                Ok(body) => debug!(%source, bytes = body.len(), ?elapsed, "Fetched feed"),
                Err(e) => error!(%source, error = %e, ?elapsed, "Feed fetch failed"),
            }
            FetchOutcome {
                source,
                result,
                elapsed,
            }
        })
        .buffer_unordered(limit)
        .collect()
        .await;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(fetched = outcomes.len() - failed, failed, "Fetched all feeds");
    outcomes
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// In-memory fetcher: known URLs answer after their delay, unknown ones fail.
    #[derive(Debug, Default)]
    pub(crate) struct StubFetcher {
        bodies: HashMap<String, (Duration, Vec<u8>)>,
    }

    impl StubFetcher {
        pub(crate) fn with(mut self, url: &str, delay_ms: u64, body: &str) -> Self {
            self.bodies.insert(
                url.to_string(),
                (Duration::from_millis(delay_ms), body.as_bytes().to_vec()),
            );
            self
        }
    }

    impl FeedFetcher for StubFetcher {
        async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            match self.bodies.get(url) {
                Some((delay, body)) => {
                    tokio::time::sleep(*delay).await;
                    Ok(body.clone())
                }
                None => Err(FetchError::Timeout { url: url.to_string() }),
            }
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_all_collects_every_outcome() {
        let fetcher = StubFetcher::default()
            .with("https://a.example/feed", 0, "A")
            .with("https://b.example/feed", 0, "B");
        let sources = [
            url("https://a.example/feed"),
            url("https://b.example/feed"),
            url("https://down.example/feed"),
        ];

        let outcomes = fetch_all(&fetcher, &sources, 0).await;
        assert_eq!(outcomes.len(), 3);

        let failed: Vec<_> = outcomes.iter().filter(|o| o.result.is_err()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].source.as_str(), "https://down.example/feed");
    }

    #[tokio::test]
    async fn test_fetch_all_returns_in_completion_order() {
        let fetcher = StubFetcher::default()
            .with("https://slow.example/", 200, "slow")
            .with("https://fast.example/", 0, "fast");
        let sources = [url("https://slow.example/"), url("https://fast.example/")];

        let outcomes = fetch_all(&fetcher, &sources, 0).await;
        let bodies: Vec<_> = outcomes
            .into_iter()
            .map(|o| String::from_utf8(o.result.unwrap()).unwrap())
            .collect();
        assert_eq!(bodies, ["fast", "slow"]);
    }

    #[tokio::test]
    async fn test_fetch_all_with_no_sources() {
        let outcomes = fetch_all(&StubFetcher::default(), &[], 0).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_http_fetcher_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rss"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<rss/>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let body = fetcher.get(&format!("{}/rss", server.uri())).await.unwrap();
        assert_eq!(body, b"<rss/>");
    }

    #[tokio::test]
    async fn test_http_fetcher_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rss"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let err = fetcher.get(&format!("{}/rss", server.uri())).await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Status { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn test_http_fetcher_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_millis(50)).unwrap();
        let err = fetcher.get(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));
    }
}
