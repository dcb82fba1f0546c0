//! Source and version policy resolution.
//!
//! Selection runs in two steps over a freshly built [`VersionTable`]:
//!
//! 1. **Source filtering** -- keep the preferred source's rows, one named
//!    source's rows, or every source as separate groups.
//! 2. **Version resolution** -- within each group pick the preferred, first,
//!    or last version, or keep them all.
//!
//! Groups are emitted in ascending source order and each group's products
//! in chronological order.

use comcat_types::{RawSubmission, SourceSelection, VersionPolicy};
use tracing::debug;

use crate::error::ProductError;
use crate::product::Product;
use crate::version::{VersionEntry, VersionTable};

/// Resolve `sources` and `policy` over one product type's submissions.
///
/// # Errors
///
/// - [`ProductError::NoSubmissions`] if `submissions` is empty.
/// - [`ProductError::SourceNotFound`] if an explicit source contributed
///   nothing.
/// - [`ProductError::NoProducts`] if resolution yields no products.
pub fn select(
    product_type: &str,
    submissions: &[RawSubmission],
    sources: &SourceSelection,
    policy: VersionPolicy,
) -> Result<Vec<Product>, ProductError> {
    let table = VersionTable::build(product_type, submissions)?;

    let groups: Vec<Vec<&VersionEntry>> = match sources {
        SourceSelection::Preferred => {
            let preferred = preferred_source(submissions).ok_or_else(|| ProductError::NoProducts {
                product_type: product_type.to_owned(),
                selection: sources.to_string(),
            })?;
            debug!(product_type, source = preferred, "resolved preferred source");
            vec![table.versions_for(preferred).collect()]
        }
        SourceSelection::Source(id) => {
            let rows: Vec<&VersionEntry> = table.versions_for(id).collect();
            if rows.is_empty() {
                return Err(ProductError::SourceNotFound {
                    product_type: product_type.to_owned(),
                    source_id: id.clone(),
                });
            }
            vec![rows]
        }
        SourceSelection::All => table
            .sources()
            .into_iter()
            .map(|source| table.versions_for(source).collect())
            .collect(),
    };

    let mut products = Vec::new();
    for group in &groups {
        for entry in resolve_versions(group, policy) {
            let submission = submissions.get(entry.index).ok_or_else(|| ProductError::NoProducts {
                product_type: product_type.to_owned(),
                selection: sources.to_string(),
            })?;
            products.push(Product::new(product_type, entry.version, submission.clone()));
        }
    }

    if products.is_empty() {
        return Err(ProductError::NoProducts {
            product_type: product_type.to_owned(),
            selection: sources.to_string(),
        });
    }

    debug!(
        product_type,
        selection = %sources,
        policy = %policy,
        groups = groups.len(),
        products = products.len(),
        "products selected"
    );
    Ok(products)
}

/// Source of the highest-weight submission.
///
/// Scans in document order; on equal weights the first submission wins.
pub fn preferred_source(submissions: &[RawSubmission]) -> Option<&str> {
    let mut best: Option<&RawSubmission> = None;
    for submission in submissions {
        if best.is_none_or(|b| submission.preferred_weight > b.preferred_weight) {
            best = Some(submission);
        }
    }
    best.map(|b| b.source.as_str())
}

/// Apply `policy` to one source's rows, given oldest first.
fn resolve_versions<'a>(
    group: &[&'a VersionEntry],
    policy: VersionPolicy,
) -> Vec<&'a VersionEntry> {
    match policy {
        VersionPolicy::Preferred => {
            let mut ranked = group.to_vec();
            ranked.sort_by(|a, b| {
                a.preferred_weight
                    .cmp(&b.preferred_weight)
                    .then_with(|| a.update_time.cmp(&b.update_time))
            });
            ranked.last().copied().into_iter().collect()
        }
        VersionPolicy::Last => group.last().copied().into_iter().collect(),
        VersionPolicy::First => group.first().copied().into_iter().collect(),
        VersionPolicy::All => group.to_vec(),
    }
}
