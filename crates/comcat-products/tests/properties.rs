//! Property-based checks of version numbering and selection.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use comcat_products::{SourceSelection, VersionPolicy, VersionTable, select};
use comcat_types::RawSubmission;
use proptest::prelude::*;

fn submissions() -> impl Strategy<Value = Vec<RawSubmission>> {
    prop::collection::vec(
        (prop::sample::select(vec!["ak", "ci", "nc", "us"]), 0_i64..8, 0_i64..50),
        1..24,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(source, weight, time)| RawSubmission::new(source, weight, time))
            .collect()
    })
}

proptest! {
    #[test]
    fn versions_are_gapless_per_source(subs in submissions()) {
        let table = VersionTable::build("origin", &subs).unwrap();
        for source in table.sources() {
            let rows: Vec<_> = table.versions_for(source).collect();
            let versions: Vec<u32> = rows.iter().map(|e| e.version).collect();
            let expected: Vec<u32> = (1..=u32::try_from(rows.len()).unwrap()).collect();
            prop_assert_eq!(versions, expected);
            let chronological = rows.is_sorted_by_key(|entry| entry.update_time);
            prop_assert!(chronological);
        }
    }

    #[test]
    fn preferred_selection_is_idempotent(subs in submissions()) {
        let preferred = SourceSelection::Preferred;
        let first = select("origin", &subs, &preferred, VersionPolicy::Preferred).unwrap();
        let second = select("origin", &subs, &preferred, VersionPolicy::Preferred).unwrap();
        prop_assert_eq!(first.len(), 1);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn preferred_source_holds_the_first_maximum_weight(subs in submissions()) {
        let max = subs.iter().map(|s| s.preferred_weight).max().unwrap();
        let expected = subs.iter().find(|s| s.preferred_weight == max).unwrap();
        let chosen =
            select("origin", &subs, &SourceSelection::Preferred, VersionPolicy::Last).unwrap();
        prop_assert!(chosen.iter().all(|p| p.source() == expected.source));
    }

    #[test]
    fn all_all_is_a_bijection(subs in submissions()) {
        let products = select("origin", &subs, &SourceSelection::All, VersionPolicy::All).unwrap();
        prop_assert_eq!(products.len(), subs.len());

        let mut pairs: Vec<(String, u32)> = products
            .iter()
            .map(|p| (p.source().to_owned(), p.version()))
            .collect();
        pairs.sort();
        pairs.dedup();
        prop_assert_eq!(pairs.len(), subs.len());

        let mut returned: Vec<(String, i64, i64)> = products
            .iter()
            .map(|p| (p.source().to_owned(), p.preferred_weight(), p.update_time_millis()))
            .collect();
        let mut input: Vec<(String, i64, i64)> = subs
            .iter()
            .map(|s| (s.source.clone(), s.preferred_weight, s.update_time))
            .collect();
        returned.sort();
        input.sort();
        prop_assert_eq!(returned, input);
    }

    #[test]
    fn all_first_is_earliest_per_source(subs in submissions()) {
        let mut earliest: BTreeMap<&str, i64> = BTreeMap::new();
        for s in &subs {
            let slot = earliest.entry(s.source.as_str()).or_insert(s.update_time);
            *slot = (*slot).min(s.update_time);
        }
        let products =
            select("origin", &subs, &SourceSelection::All, VersionPolicy::First).unwrap();
        prop_assert_eq!(products.len(), earliest.len());
        for product in &products {
            prop_assert_eq!(product.version(), 1);
            let expected = earliest.get(product.source()).copied();
            prop_assert_eq!(Some(product.update_time_millis()), expected);
        }
    }

    #[test]
    fn all_last_is_latest_version_per_source(subs in submissions()) {
        let table = VersionTable::build("origin", &subs).unwrap();
        let products =
            select("origin", &subs, &SourceSelection::All, VersionPolicy::Last).unwrap();
        for product in &products {
            prop_assert_eq!(Some(product.version()), table.latest_version(product.source()));
        }
    }
}
