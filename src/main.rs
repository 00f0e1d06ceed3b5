//! # News Feed Aggregator
//!
//! Fetches a handful of news feeds concurrently and reduces them to one
//! deduplicated list of `{title, url, description}` records.
//!
//! ## Features
//!
//! - Reads both RSS 2.0 channels (`<item>`) and Atom feeds (`<entry>`)
//! - Pulls a summary, an image and a "continue reading" link out of the HTML
//!   Atom sources embed in their entries
//! - Keeps the first record seen for each title
//! - Isolates failures: a source that errors, times out or serves garbage
//!   just contributes nothing
//!
//! ## Usage
//!
//! ```sh
//! RUST_LOG=debug news_feed_aggregator -f https://example.com/rss
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: one request per source, all in flight at once
//! 2. **Decoding**: bytes to an RSS channel or Atom feed document
//! 3. **Normalizing**: items kept verbatim, entries run through the markup extractor
//! 4. **Aggregating**: folded serially into one title-deduplicated collection

use clap::Parser;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod aggregate;
mod cli;
mod extract;
mod feeds;
mod fetch;
mod models;
mod pipeline;
mod utils;

use cli::Cli;
use fetch::HttpFetcher;
use pipeline::aggregate_feeds;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");
    info!(feeds = args.feeds.len(), timeout_secs = args.timeout_secs, "news aggregator starting up");

    let fetcher = HttpFetcher::new(Duration::from_secs(args.timeout_secs))?;
    let collection = aggregate_feeds(&fetcher, &args.feeds, args.max_in_flight).await;

    for record in &collection {
        println!("{}", record.title);
    }

    let elapsed = start_time.elapsed();
    println!("News quantity: {}", collection.len());
    println!("Took {elapsed:?}");

    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        count = collection.len(),
        "Execution complete"
    );

    Ok(())
}
