//! Bytes to [`FeedDocument`] decoding.
//!
//! A pull-parser walk over the document rather than a serde binding: feeds
//! routinely repeat or namespace elements inside an item (`<atom:link>`,
//! `<media:title>`, a second `<description>`), and none of that should cost
//! the source its records.
//!
//! Binding rules:
//! - `<item>` elements whose parent is `<channel>` become [`RssItem`]s
//! - `<entry>` elements directly under the root become [`AtomEntry`]s
//! - only unprefixed direct children of an item or entry are read
//! - a field's value is all text inside it (nested markup flattened), trimmed
//! - the first non-empty value of a repeated field wins
//! - every unprefixed `<link>` of an entry is kept with its `href` and `rel`

use crate::models::{AtomEntry, AtomLink, FeedDocument, RssItem};
use crate::utils::{decode_entities, truncate_for_log};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

#[derive(Debug)]
enum Record {
    Item(RssItem),
    Entry(AtomEntry),
}

#[derive(Debug)]
struct OpenRecord {
    depth: usize,
    record: Record,
}

#[derive(Debug)]
struct OpenField {
    name: String,
    depth: usize,
    text: String,
}

/// Collects items and entries while the reader walks the document.
#[derive(Debug, Default)]
struct DocumentBuilder {
    /// Qualified names of the currently open elements.
    path: Vec<String>,
    record: Option<OpenRecord>,
    field: Option<OpenField>,
    items: Vec<RssItem>,
    entries: Vec<AtomEntry>,
}

impl DocumentBuilder {
    fn open(&mut self, tag: &BytesStart<'_>, empty: bool) {
        let depth = self.path.len() + 1;

        if tag.name().prefix().is_none() {
            let local = String::from_utf8_lossy(tag.local_name().as_ref()).into_owned();
            match self.record.as_ref().map(|open| open.depth) {
                None => self.open_record(&local, depth, empty),
                Some(record_depth) if self.field.is_none() && depth == record_depth + 1 => {
                    self.open_field(tag, local, depth, empty)
                }
                Some(_) => {}
            }
        }

        if !empty {
            self.path
                .push(String::from_utf8_lossy(tag.name().as_ref()).into_owned());
        }
    }

    fn open_record(&mut self, local: &str, depth: usize, empty: bool) {
        let parent = self.path.last().map(String::as_str);
        let record = match local {
            "item" if parent == Some("channel") => Record::Item(RssItem::default()),
            "entry" if depth == 2 => Record::Entry(AtomEntry::default()),
            _ => return,
        };
        if empty {
            self.finish_record(record);
        } else {
            self.record = Some(OpenRecord { depth, record });
        }
    }

    fn open_field(&mut self, tag: &BytesStart<'_>, local: String, depth: usize, empty: bool) {
        if let Some(OpenRecord {
            record: Record::Entry(entry),
            ..
        }) = &mut self.record
        {
            if local == "link" {
                entry.links.push(atom_link(tag));
                return;
            }
        }
        if !empty {
            self.field = Some(OpenField {
                name: local,
                depth,
                text: String::new(),
            });
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(field) = &mut self.field {
            field.text.push_str(text);
        }
    }

    fn close(&mut self) {
        let depth = self.path.len();
        if let Some(field) = self.field.take_if(|f| f.depth == depth) {
            self.assign(field);
        } else if let Some(open) = self.record.take_if(|r| r.depth == depth) {
            self.finish_record(open.record);
        }
        self.path.pop();
    }

    fn assign(&mut self, field: OpenField) {
        let Some(open) = &mut self.record else {
            return;
        };
        let slot = match (&mut open.record, field.name.as_str()) {
            (Record::Item(item), "title") => &mut item.title,
            (Record::Item(item), "link") => &mut item.link,
            (Record::Item(item), "description") => &mut item.description,
            (Record::Item(item), "pubDate") => &mut item.pub_date,
            (Record::Entry(entry), "title") => &mut entry.title,
            (Record::Entry(entry), "content") => &mut entry.content,
            (Record::Entry(entry), "summary") => &mut entry.summary,
            (Record::Entry(entry), "published") => &mut entry.published,
            (Record::Entry(entry), "updated") => &mut entry.updated,
            _ => return,
        };
        let value = field.text.trim();
        if slot.is_empty() && !value.is_empty() {
            *slot = value.to_string();
        }
    }

    fn finish_record(&mut self, record: Record) {
        match record {
            Record::Item(item) => self.items.push(item),
            Record::Entry(entry) => self.entries.push(entry),
        }
    }

    fn finish(self) -> FeedDocument {
        FeedDocument::from_parts(self.items, self.entries)
    }
}

fn atom_link(tag: &BytesStart<'_>) -> AtomLink {
    let mut link = AtomLink::default();
    for attr in tag.attributes().flatten() {
        match attr.key.as_ref() {
            b"href" => link.href = decode_entities(&attr.value),
            b"rel" => link.rel = Some(decode_entities(&attr.value)),
            _ => {}
        }
    }
    link
}

fn read_document(xml: &str) -> Result<FeedDocument, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut builder = DocumentBuilder::default();

    loop {
        match reader.read_event()? {
            Event::Start(tag) => builder.open(&tag, false),
            Event::Empty(tag) => builder.open(&tag, true),
            Event::End(_) => builder.close(),
            Event::Text(text) => builder.text(&decode_entities(&text)),
            Event::CData(data) => builder.text(&String::from_utf8_lossy(&data)),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(builder.finish())
}

/// Decode one source's response body.
///
/// Malformed XML, an empty body or an unrelated document all yield
/// [`FeedDocument::empty`], which contributes no records downstream.
pub fn decode(bytes: &[u8]) -> FeedDocument {
    if bytes.is_empty() {
        return FeedDocument::empty();
    }

    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_start_matches('\u{feff}');

    match read_document(text) {
        Ok(doc) => {
            debug!(shape = doc.shape(), count = doc.len(), "Decoded feed document");
            doc
        }
        Err(e) => {
            warn!(
                error = %e,
                body_preview = %truncate_for_log(text, 200),
                "Feed body is not well-formed XML; treating as empty"
            );
            FeedDocument::empty()
        }
    }
}
