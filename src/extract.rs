//! Summary, image and "continue reading" link extraction from embedded HTML.
//!
//! Atom sources ship each entry's body as an HTML blob with a fixed layout:
//!
//! ```text
//! <img src="IMAGE"/>            optional, possibly wrapped in <figure>
//! <p>SUMMARY</p>                first paragraph: the summary text
//! <p><a href="URL">More</a></p> second paragraph: the continuation link
//! ```
//!
//! Rather than building a DOM, [`extract`] walks a forward-only token stream
//! once and switches behaviour on how many paragraphs it has opened:
//!
//! | State | Token | Effect | Next |
//! |-------|-------|--------|------|
//! | `Scanning` | `<img src>` | record image | `Scanning` |
//! | `Scanning` | `<p>` | append the following text token | `InParagraph` |
//! | `InParagraph` | `<p>` | seek the first `<a href>` | `AfterLink` |
//! | any | end of input / malformed markup | stop | `Done` |
//!
//! Images are recorded in every live state, so the last `<img>` wins. The
//! anchor seek is bounded both by input exhaustion and by
//! [`ANCHOR_SEEK_BUDGET`] tokens.

use crate::models::ExtractedContent;
use crate::utils::decode_entities;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::iter::Peekable;
use tracing::{debug, trace};

/// Most tokens the anchor seek will consume inside the second paragraph.
pub const ANCHOR_SEEK_BUDGET: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    InParagraph,
    AfterLink,
    Done,
}

#[derive(Debug)]
enum Token<'a> {
    /// Opening or self-closing tag.
    Start(BytesStart<'a>),
    End,
    /// Literal text: entity-decoded for text, verbatim for CDATA.
    Text(String),
    /// Comments, doctypes, processing instructions.
    Other,
}

/// Lenient HTML tokenizer over quick-xml's pull reader.
///
/// End-tag matching is switched off so HTML void elements (`<img>`, `<br>`)
/// and stray closing tags don't abort the stream. Any reader error ends it.
struct TokenStream<'a> {
    reader: Reader<&'a [u8]>,
    finished: bool,
}

impl<'a> TokenStream<'a> {
    fn new(html: &'a str) -> Self {
        let mut reader = Reader::from_str(html);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.check_comments = false;
        config.expand_empty_elements = false;
        config.trim_text(false);
        Self {
            reader,
            finished: false,
        }
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.finished {
            return None;
        }
        match self.reader.read_event() {
            Ok(Event::Start(tag)) | Ok(Event::Empty(tag)) => Some(Token::Start(tag)),
            Ok(Event::End(_)) => Some(Token::End),
            Ok(Event::Text(text)) => Some(Token::Text(decode_entities(&text))),
            Ok(Event::CData(data)) => Some(Token::Text(String::from_utf8_lossy(&data).into_owned())),
            Ok(Event::Eof) => {
                self.finished = true;
                None
            }
            Ok(_) => Some(Token::Other),
            Err(e) => {
                debug!(
                    error = %e,
                    position = self.reader.buffer_position(),
                    "Malformed embedded markup; ending scan"
                );
                self.finished = true;
                None
            }
        }
    }
}

fn is_tag(tag: &BytesStart<'_>, name: &[u8]) -> bool {
    tag.name().as_ref().eq_ignore_ascii_case(name)
}

/// First non-empty value of attribute `key`, entity-decoded.
fn attr_value(tag: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    tag.html_attributes()
        .flatten()
        .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(key))
        .map(|attr| decode_entities(&attr.value))
        .filter(|value| !value.is_empty())
}

/// Pull image, summary text and continuation link out of an HTML blob.
///
/// Never fails: anything the markup doesn't provide stays an empty string.
/// The result depends only on `html`.
pub fn extract(html: &str) -> ExtractedContent {
    let mut content = ExtractedContent::default();
    let mut tokens = TokenStream::new(html).peekable();
    let mut state = ScanState::Scanning;

    while state != ScanState::Done {
        state = match tokens.next() {
            None => ScanState::Done,
            Some(Token::Start(tag)) if is_tag(&tag, b"img") => {
                if let Some(src) = attr_value(&tag, b"src") {
                    content.image_source = src;
                }
                state
            }
            Some(Token::Start(tag)) if is_tag(&tag, b"p") => match state {
                ScanState::Scanning => {
                    if let Some(Token::Text(text)) =
                        tokens.next_if(|t| matches!(t, Token::Text(_)))
                    {
                        content.text_content.push_str(&text);
                    }
                    ScanState::InParagraph
                }
                ScanState::InParagraph => seek_continue_link(&mut tokens, &mut content),
                other => other,
            },
            Some(_) => state,
        };
    }

    trace!(?content, "Extracted embedded content");
    content
}

/// Advance until an `<a>` with a non-empty `href` shows up.
fn seek_continue_link<'a, I>(tokens: &mut Peekable<I>, content: &mut ExtractedContent) -> ScanState
where
    I: Iterator<Item = Token<'a>>,
{
    for _ in 0..ANCHOR_SEEK_BUDGET {
        match tokens.next() {
            None => return ScanState::Done,
            Some(Token::Start(tag)) if is_tag(&tag, b"a") => {
                if let Some(href) = attr_value(&tag, b"href") {
                    content.continue_reading_url = href;
                    return ScanState::AfterLink;
                }
            }
            Some(_) => {}
        }
    }
    debug!(budget = ANCHOR_SEEK_BUDGET, "No continuation link within budget");
    ScanState::AfterLink
}
