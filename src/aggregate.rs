//! The deduplicated, insertion-ordered record collection.

use crate::models::NormalizedRecord;
use std::collections::HashSet;
use tracing::trace;

/// Records from every source, in the order they were accepted.
///
/// Titles are unique: the first record with a given title is kept and later
/// ones are dropped. Comparison is exact, with no case or whitespace folding.
#[derive(Debug, Default)]
pub struct Collection {
    records: Vec<NormalizedRecord>,
    titles: HashSet<String>,
}

impl Collection {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a record with exactly this title is already held.
    pub fn contains_title(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    /// Append `record` unless its title is taken.
    ///
    /// # Arguments
    ///
    /// * `record` - Candidate record; its `title` is the membership key
    ///
    /// # Returns
    ///
    /// `true` when the record was appended, `false` when an earlier record
    /// already holds the title and this one was dropped.
    pub fn dedupe_append(&mut self, record: NormalizedRecord) -> bool {
        if self.titles.contains(&record.title) {
            trace!(title = %record.title, "Dropping duplicate title");
            return false;
        }
        self.titles.insert(record.title.clone());
        self.records.push(record);
        true
    }

    /// Number of records accepted so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in the order they were accepted.
    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedRecord> {
        self.records.iter()
    }

    /// Consume the collection, keeping acceptance order.
    pub fn into_records(self) -> Vec<NormalizedRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a NormalizedRecord;
    type IntoIter = std::slice::Iter<'a, NormalizedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
