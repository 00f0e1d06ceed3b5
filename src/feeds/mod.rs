//! Feed decoding and normalization.
//!
//! Raw bytes from a source go through two steps here:
//!
//! 1. [`decode`]: bind the XML to a [`FeedDocument`](crate::models::FeedDocument),
//!    RSS channel or Atom feed, never failing
//! 2. [`normalize`]: fold the document's items or entries into the running
//!    [`Collection`](crate::aggregate::Collection)
//!
//! Which shape a document has is decided from what decoding populated, not
//! from which source it came from, so one path serves every source.

pub mod decode;
pub mod normalize;
