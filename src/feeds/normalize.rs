//! Folding a decoded document into the uniform record shape.

use crate::aggregate::Collection;
use crate::extract::extract;
use crate::models::{AtomEntry, ExtractedContent, FeedDocument, NormalizedRecord, RssItem};
use tracing::debug;

/// Description of an HTML-bearing entry: summary text, then the image and
/// continuation lines. Empty parts keep their labels.
pub fn compose_description(content: &ExtractedContent) -> String {
    format!(
        "{}\nImage source: {}\nRead more: {}",
        content.text_content, content.image_source, content.continue_reading_url
    )
}

fn from_item(item: RssItem) -> NormalizedRecord {
    debug!(title = %item.title, published = %item.pub_date, "Normalizing channel item");
    NormalizedRecord::new(item.title, item.link, item.description)
}

fn from_entry(entry: &AtomEntry) -> NormalizedRecord {
    debug!(title = %entry.title, published = %entry.date(), "Normalizing feed entry");
    let content = extract(entry.markup());
    NormalizedRecord::new(entry.title.clone(), entry.link(), compose_description(&content))
}

/// Append every new record from `doc` to `collection`, keeping document order.
///
/// Channel items keep their description verbatim; feed entries are run
/// through [`extract`] first. Entries whose title is already present are
/// skipped before extraction. Returns how many records were appended.
pub fn normalize(doc: FeedDocument, collection: &mut Collection) -> usize {
    let before = collection.len();
    let total = doc.len();

    match doc {
        FeedDocument::Channel { items } => {
            for item in items {
                if !collection.contains_title(&item.title) {
                    collection.dedupe_append(from_item(item));
                }
            }
        }
        FeedDocument::Feed { entries } => {
            for entry in &entries {
                if !collection.contains_title(&entry.title) {
                    collection.dedupe_append(from_entry(entry));
                }
            }
        }
    }

    let added = collection.len() - before;
    debug!(total, added, duplicates = total - added, "Normalized feed document");
    added
}
