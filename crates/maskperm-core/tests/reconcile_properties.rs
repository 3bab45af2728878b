// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
use std::collections::BTreeSet;

use maskperm_core::memory::{MemoryStore, StaticCatalogue};
use maskperm_core::{
    AllowList, CatalogueItem, EngineConfig, GroupId, PassthroughLabels, ReconciliationEngine,
    UpdateRequest,
};
use proptest::prelude::*;

fn identifier() -> impl Strategy<Value = String> {
    prop_oneof![
        "mask_[a-z]{1,6}",
        "(std|tx|bullets)_[a-z]{1,4}",
        Just("--div--".to_owned()),
    ]
}

fn catalogue_items() -> impl Strategy<Value = Vec<CatalogueItem>> {
    prop::collection::vec(identifier(), 0..12)
        .prop_map(|ids| ids.into_iter().map(|id| CatalogueItem::new(id.clone(), id)).collect())
}

fn allow_list() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(identifier(), 0..10)
}

fn snapshot(store: &MemoryStore, id: u32) -> AllowList {
    store.allow_list(GroupId(id)).unwrap_or_default()
}

proptest! {
    #[test]
    fn auto_update_covers_catalogue_and_only_grows(
        items in catalogue_items(),
        initial in allow_list(),
    ) {
        let store = MemoryStore::new().with_group(1, "g", initial.clone());
        let engine = ReconciliationEngine::new(
            EngineConfig::default(),
            StaticCatalogue::new(items),
            PassthroughLabels,
            &store,
        );
        let before = snapshot(&store, 1);

        let report = engine.reconcile(UpdateRequest::Group(GroupId(1))).unwrap();
        prop_assert!(report.is_success());

        let after = snapshot(&store, 1);
        prop_assert!(before.is_subset(&after));
        prop_assert!(!engine.update_necessary(Some(GroupId(1))).unwrap());
    }

    #[test]
    fn auto_update_is_idempotent(
        items in catalogue_items(),
        initial in allow_list(),
    ) {
        let store = MemoryStore::new().with_group(1, "g", initial);
        let engine = ReconciliationEngine::new(
            EngineConfig::default(),
            StaticCatalogue::new(items),
            PassthroughLabels,
            &store,
        );

        engine.reconcile(UpdateRequest::Group(GroupId(1))).unwrap();
        let once = snapshot(&store, 1);
        let second = engine.reconcile(UpdateRequest::Group(GroupId(1))).unwrap();
        prop_assert_eq!(second.unchanged, vec![GroupId(1)]);
        prop_assert_eq!(snapshot(&store, 1), once);
    }

    #[test]
    fn explicit_update_is_exact(
        items in catalogue_items(),
        initial in allow_list(),
        selected in allow_list(),
    ) {
        let config = EngineConfig::default();
        let store = MemoryStore::new().with_group(1, "g", initial.clone());
        let engine = ReconciliationEngine::new(
            config.clone(),
            StaticCatalogue::new(items),
            PassthroughLabels,
            &store,
        );

        engine
            .reconcile(UpdateRequest::Explicit { group: GroupId(1), selected: selected.clone() })
            .unwrap();

        let expected: BTreeSet<String> =
            selected.into_iter().filter(|id| config.is_in_scope(id)).collect();
        prop_assert_eq!(engine.selected_masks(GroupId(1)).unwrap(), expected);

        let untouched_before: BTreeSet<String> =
            initial.into_iter().filter(|id| !config.is_in_scope(id)).collect();
        let untouched_after: BTreeSet<String> = snapshot(&store, 1)
            .iter()
            .filter(|id| !config.is_in_scope(id))
            .map(str::to_owned)
            .collect();
        prop_assert_eq!(untouched_before, untouched_after);
    }

    #[test]
    fn bulk_status_matches_per_group_status(
        items in catalogue_items(),
        lists in prop::collection::vec(allow_list(), 0..5),
    ) {
        let mut store = MemoryStore::new();
        for (idx, list) in lists.iter().enumerate() {
            store = store.with_group(u32::try_from(idx).unwrap_or(u32::MAX), "g", list.clone());
        }
        let engine = ReconciliationEngine::new(
            EngineConfig::default(),
            StaticCatalogue::new(items),
            PassthroughLabels,
            &store,
        );

        let any_stale = (0..lists.len())
            .map(|idx| u32::try_from(idx).unwrap_or(u32::MAX))
            .any(|idx| engine.update_necessary(Some(GroupId(idx))).unwrap());
        prop_assert_eq!(engine.update_necessary(None).unwrap(), any_stale);

        engine.reconcile(UpdateRequest::AllGroups).unwrap();
        prop_assert!(!engine.update_necessary(None).unwrap());
    }
}
