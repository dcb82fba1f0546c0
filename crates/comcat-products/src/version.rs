//! Per-source version numbering of product submissions.
//!
//! The catalog does not number submissions. Amendments from one network may
//! arrive interleaved with, or out of order relative to, submissions from
//! other networks, so a version history is reconstructed here from update
//! times alone: within each source, the oldest submission is version 1, the
//! next is version 2, and so on. Sources number independently.

use std::collections::BTreeMap;

use comcat_types::RawSubmission;

use crate::error::ProductError;

/// One submission's row in a [`VersionTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    /// Contributing source network.
    pub source: String,
    /// Catalog update time, epoch milliseconds.
    pub update_time: i64,
    /// Catalog authority weight.
    pub preferred_weight: i64,
    /// Position of the submission in the document's list.
    pub index: usize,
    /// Version within the source, starting at 1.
    pub version: u32,
}

/// Version history for one product type of one event.
///
/// Entries are ordered by source (lexicographic) and then by update time.
/// Submissions sharing both keep their document order. The table is cheap
/// to rebuild and is never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTable {
    product_type: String,
    entries: Vec<VersionEntry>,
}

impl VersionTable {
    /// Number the submissions of `product_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::NoSubmissions`] if `submissions` is empty.
    pub fn build(product_type: &str, submissions: &[RawSubmission]) -> Result<Self, ProductError> {
        if submissions.is_empty() {
            return Err(ProductError::NoSubmissions {
                product_type: product_type.to_owned(),
            });
        }

        let mut entries: Vec<VersionEntry> = submissions
            .iter()
            .enumerate()
            .map(|(index, submission)| VersionEntry {
                source: submission.source.clone(),
                update_time: submission.update_time,
                preferred_weight: submission.preferred_weight,
                index,
                version: 0,
            })
            .collect();

        // Stable: equal (source, time) rows stay in document order.
        entries.sort_by(|a, b| {
            a.source
                .cmp(&b.source)
                .then_with(|| a.update_time.cmp(&b.update_time))
        });

        let mut next_version: BTreeMap<String, u32> = BTreeMap::new();
        for entry in &mut entries {
            let counter = next_version.entry(entry.source.clone()).or_insert(1);
            entry.version = *counter;
            *counter = counter.saturating_add(1);
        }

        Ok(Self {
            product_type: product_type.to_owned(),
            entries,
        })
    }

    /// Product type this table numbers.
    pub fn product_type(&self) -> &str {
        &self.product_type
    }

    /// All rows, sorted by source then update time.
    pub fn entries(&self) -> &[VersionEntry] {
        &self.entries
    }

    /// Number of submissions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: a table is never built from an empty list.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct sources in ascending order.
    pub fn sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = self.entries.iter().map(|e| e.source.as_str()).collect();
        sources.dedup();
        sources
    }

    /// One source's rows, oldest first.
    pub fn versions_for<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a VersionEntry> {
        self.entries.iter().filter(move |e| e.source == source)
    }

    /// The row for the submission at `index` in the document's list.
    pub fn entry_for_index(&self, index: usize) -> Option<&VersionEntry> {
        self.entries.iter().find(|e| e.index == index)
    }

    /// Highest version number assigned to `source`.
    pub fn latest_version(&self, source: &str) -> Option<u32> {
        self.versions_for(source).map(|e| e.version).max()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn origin_submissions() -> Vec<RawSubmission> {
        vec![
            RawSubmission::new("us", 1, 100),
            RawSubmission::new("us", 2, 200),
            RawSubmission::new("ci", 5, 150),
        ]
    }

    fn version_of(table: &VersionTable, index: usize) -> u32 {
        table.entry_for_index(index).unwrap().version
    }

    #[test]
    fn numbers_each_source_from_one() {
        let table = VersionTable::build("origin", &origin_submissions()).unwrap();
        assert_eq!(table.product_type(), "origin");
        assert_eq!(table.len(), 3);
        assert_eq!(version_of(&table, 0), 1); // us@100
        assert_eq!(version_of(&table, 1), 2); // us@200
        assert_eq!(version_of(&table, 2), 1); // ci@150
    }

    #[test]
    fn sorted_by_source_then_time() {
        let table = VersionTable::build("origin", &origin_submissions()).unwrap();
        let order: Vec<(&str, i64)> = table
            .entries()
            .iter()
            .map(|e| (e.source.as_str(), e.update_time))
            .collect();
        assert_eq!(order, vec![("ci", 150), ("us", 100), ("us", 200)]);
        assert_eq!(table.sources(), vec!["ci", "us"]);
    }

    #[test]
    fn out_of_order_amendments_are_renumbered_by_time() {
        let submissions = vec![
            RawSubmission::new("nc", 10, 900),
            RawSubmission::new("nc", 10, 300),
            RawSubmission::new("us", 10, 500),
            RawSubmission::new("nc", 10, 600),
        ];
        let table = VersionTable::build("shakemap", &submissions).unwrap();
        assert_eq!(version_of(&table, 1), 1);
        assert_eq!(version_of(&table, 3), 2);
        assert_eq!(version_of(&table, 0), 3);
        assert_eq!(version_of(&table, 2), 1);
        assert_eq!(table.latest_version("nc"), Some(3));
        assert_eq!(table.latest_version("ak"), None);
    }

    #[test]
    fn equal_times_keep_document_order() {
        let submissions = vec![
            RawSubmission::new("us", 3, 100),
            RawSubmission::new("us", 9, 100),
        ];
        let table = VersionTable::build("dyfi", &submissions).unwrap();
        assert_eq!(version_of(&table, 0), 1);
        assert_eq!(version_of(&table, 1), 2);
    }

    #[test]
    fn versions_for_filters_one_source() {
        let table = VersionTable::build("origin", &origin_submissions()).unwrap();
        let us: Vec<u32> = table.versions_for("us").map(|e| e.version).collect();
        assert_eq!(us, vec![1, 2]);
        assert_eq!(table.versions_for("nn").count(), 0);
    }

    #[test]
    fn empty_list_is_not_found() {
        let err = VersionTable::build("losspager", &[]).unwrap_err();
        assert!(matches!(err, ProductError::NoSubmissions { .. }));
        assert!(err.is_not_found());
    }
}
