//! Command-line interface definitions.
//!
//! Every option has a default, so running the binary with no arguments
//! aggregates the built-in sources.

use clap::Parser;
use url::Url;

/// Sources aggregated when no `--feed` is given.
pub const DEFAULT_FEEDS: [&str; 3] = [
    "https://www.gamespot.com/feeds/game-news",
    "http://feeds.feedburner.com/ign/all",
    "https://www.polygon.com/rss/index.xml",
];

/// Fetch RSS and Atom news feeds and print one deduplicated list of headlines.
///
/// # Examples
///
/// ```sh
/// # Built-in sources
/// news_feed_aggregator
///
/// # Custom sources with a tighter timeout
/// news_feed_aggregator -f https://example.com/rss -f https://example.org/atom.xml -t 5
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Feed URL to aggregate (repeatable)
    #[arg(short, long = "feed", value_name = "URL", default_values = DEFAULT_FEEDS)]
    pub feeds: Vec<Url>,

    /// Per-feed request timeout in seconds; a timed-out feed contributes nothing
    #[arg(short, long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Upper bound on concurrent requests (0 = one per feed)
    #[arg(long, default_value_t = 0)]
    pub max_in_flight: usize,
}
