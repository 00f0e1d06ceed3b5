//! Data models for decoded feeds and the records built from them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RssItem`], [`AtomEntry`]: the two decoded entry shapes a source can publish
//! - [`FeedDocument`]: a decoded document, tagged by which of the two shapes it carries
//! - [`ExtractedContent`]: what the markup scan pulls out of an embedded HTML blob
//! - [`NormalizedRecord`]: the uniform record every source is reduced to
//!
//! Missing elements are empty strings throughout; nothing here is optional.

/// A news record in the uniform shape shared by every source.
///
/// `title` is the identity key: the aggregated collection holds at most one
/// record per exact title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// Headline, compared byte-for-byte during deduplication.
    pub title: String,
    /// Link to the story.
    pub url: String,
    /// Plain description, or the composed summary for HTML-bearing entries.
    pub description: String,
}

impl NormalizedRecord {
    /// Build a record from its three parts.
    ///
    /// # Arguments
    ///
    /// * `title` - Headline; used as the deduplication key
    /// * `url` - Link to the story
    /// * `description` - Plain text or composed summary
    pub fn new(title: impl Into<String>, url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: description.into(),
        }
    }
}

/// The three pieces of information pulled out of an embedded HTML blob.
///
/// Absent data is an empty string, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    /// `src` of the last `<img>` seen.
    pub image_source: String,
    /// Text of the first paragraph.
    pub text_content: String,
    /// `href` of the first anchor in the second paragraph.
    pub continue_reading_url: String,
}

/// One `<item>` of an RSS 2.0 channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RssItem {
    pub title: String,
    pub link: String,
    pub description: String,
    /// `<pubDate>`, kept as published (RFC 2822 in practice).
    pub pub_date: String,
}

/// `<link rel=".." href=".."/>` inside an Atom entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomLink {
    pub href: String,
    /// `None` when the attribute is absent, which Atom reads as `alternate`.
    pub rel: Option<String>,
}

/// One `<entry>` of an Atom feed. Its content is usually escaped HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomEntry {
    pub title: String,
    pub links: Vec<AtomLink>,
    pub content: String,
    pub summary: String,
    pub published: String,
    pub updated: String,
}

impl AtomEntry {
    /// The entry's permalink.
    ///
    /// Prefers an `alternate` link (a missing `rel` means `alternate` in Atom),
    /// then any link with an `href`, then the empty string.
    pub fn link(&self) -> &str {
        self.links
            .iter()
            .find(|l| {
                !l.href.is_empty() && l.rel.as_deref().is_none_or(|rel| rel == "alternate")
            })
            .or_else(|| self.links.iter().find(|l| !l.href.is_empty()))
            .map(|l| l.href.as_str())
            .unwrap_or_default()
    }

    /// The embedded markup to scan: `<content>`, falling back to `<summary>`.
    pub fn markup(&self) -> &str {
        if self.content.is_empty() {
            &self.summary
        } else {
            &self.content
        }
    }

    /// `<published>`, or `<updated>` when the entry was never marked published.
    pub fn date(&self) -> &str {
        if self.published.is_empty() {
            &self.updated
        } else {
            &self.published
        }
    }
}

/// A decoded feed document in exactly one of the two supported shapes.
#[derive(Debug, Clone)]
pub enum FeedDocument {
    /// RSS-style: items with plain-text descriptions.
    Channel { items: Vec<RssItem> },
    /// Atom-style: entries whose content may be embedded HTML.
    Feed { entries: Vec<AtomEntry> },
}

impl FeedDocument {
    /// The document a failed fetch or decode stands in for. Yields no records.
    pub fn empty() -> Self {
        FeedDocument::Feed { entries: Vec::new() }
    }

    /// Pick the shape structurally.
    ///
    /// Non-empty items with no entries is a channel; anything else, including
    /// a document with both or neither, is treated as a feed.
    pub fn from_parts(items: Vec<RssItem>, entries: Vec<AtomEntry>) -> Self {
        if !items.is_empty() && entries.is_empty() {
            FeedDocument::Channel { items }
        } else {
            FeedDocument::Feed { entries }
        }
    }

    /// Short label for logs: `"channel"`, `"feed"`, or `"empty"` for a feed
    /// with no entries.
    pub fn shape(&self) -> &'static str {
        match self {
            FeedDocument::Channel { .. } => "channel",
            FeedDocument::Feed { entries } if entries.is_empty() => "empty",
            FeedDocument::Feed { .. } => "feed",
        }
    }

    /// Number of items or entries, before any deduplication.
    pub fn len(&self) -> usize {
        match self {
            FeedDocument::Channel { items } => items.len(),
            FeedDocument::Feed { entries } => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
