//! Property-based tests for tally machine invariants.
//!
//! Uses `proptest` to drive arbitrary keystroke sequences through the machine
//! and check that the store stays consistent: one record per touched key,
//! counts that match a simple reference tally in normal mode, a total display
//! order, and renders that never mutate state.

use std::collections::HashSet;

use proptest::prelude::*;

use super::model::{CANCEL, COMMIT, Mode, TallyModel};
use super::render::render;
use super::update::update;
use crate::core::config::RenderConfig;
use crate::store::RecordStore;

// ──────────────────── strategies ────────────────────

fn arb_input_char() -> impl Strategy<Value = char> {
    prop_oneof![
        4 => prop::sample::select(vec!['a', 'b', 'c', 'x', ' ', '?', 'é']),
        2 => prop::char::range('0', '9'),
        1 => Just('='),
        1 => Just('+'),
        1 => Just('-'),
        1 => Just(CANCEL),
        1 => Just(COMMIT),
        1 => Just('\t'),
    ]
}

fn arb_input() -> impl Strategy<Value = Vec<char>> {
    prop::collection::vec(arb_input_char(), 0..80)
}

fn assert_store_consistent(store: &RecordStore) {
    let keys: Vec<char> = store.iter().map(|r| r.key).collect();
    let unique: HashSet<char> = keys.iter().copied().collect();
    assert_eq!(keys.len(), unique.len(), "duplicate key in order: {keys:?}");
    assert_eq!(keys.len(), store.len());
    for key in &keys {
        assert_eq!(store.get(*key).map(|r| r.key), Some(*key));
    }
}

proptest! {
    #[test]
    fn store_order_and_map_stay_in_sync(input in arb_input()) {
        let mut model = TallyModel::default();
        for c in input {
            update(&mut model, c);
            assert_store_consistent(&model.store);
        }
    }

    #[test]
    fn only_touched_keys_have_records(input in arb_input()) {
        let mut model = TallyModel::default();
        for c in &input {
            update(&mut model, *c);
        }
        let typed: HashSet<char> = input.iter().copied().collect();
        for record in model.store.iter() {
            prop_assert!(typed.contains(&record.key));
        }
    }

    #[test]
    fn normal_mode_keystrokes_match_reference_tally(
        keys in prop::collection::vec(prop::sample::select(vec!['a', 'b', 'c', '1', ' ']), 0..60)
    ) {
        let mut model = TallyModel::default();
        let mut expected = std::collections::HashMap::<char, u64>::new();
        for key in keys {
            update(&mut model, key);
            *expected.entry(key).or_default() += 1;
        }
        prop_assert_eq!(model.store.len(), expected.len());
        for (key, count) in expected {
            prop_assert_eq!(model.count_of(key), count);
        }
    }

    #[test]
    fn decrement_is_saturating(start in any::<u64>(), delta in any::<u64>()) {
        let mut store = RecordStore::new();
        store.increment('k', start);
        store.decrement('k', delta);
        prop_assert_eq!(store.get('k').map(|r| r.count), Some(start.saturating_sub(delta)));
    }

    #[test]
    fn relabel_never_changes_count(input in arb_input(), label in "[a-z ]{0,12}") {
        let mut model = TallyModel::default();
        for c in input {
            update(&mut model, c);
        }
        let snapshot: Vec<(char, u64)> = model.store.iter().map(|r| (r.key, r.count)).collect();
        for (key, _) in &snapshot {
            model.store.relabel(*key, label.clone());
        }
        let after: Vec<(char, u64)> = model.store.iter().map(|r| (r.key, r.count)).collect();
        prop_assert_eq!(snapshot, after);
    }

    #[test]
    fn ordered_view_is_sorted_and_complete(input in arb_input()) {
        let mut model = TallyModel::default();
        for c in input {
            update(&mut model, c);
        }
        let view = model.store.ordered_view();
        prop_assert_eq!(view.len(), model.store.len());
        for pair in view.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(
                a.count > b.count
                    || (a.count == b.count && a.label < b.label)
                    || (a.count == b.count && a.label == b.label && a.key < b.key),
                "out of order: {:?} before {:?}", a, b
            );
        }
    }

    #[test]
    fn render_is_deterministic_and_side_effect_free(input in arb_input()) {
        let mut model = TallyModel::default();
        for c in input {
            update(&mut model, c);
        }
        let before = model.clone();
        let first = render(&model, &RenderConfig::default());
        let second = render(&model, &RenderConfig::default());
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(before.store, model.store);
        prop_assert_eq!(before.mode, model.mode);
        prop_assert!(first.ends_with("Press the '?' key for help.\n"));
    }

    #[test]
    fn entry_modes_always_have_a_selection(input in arb_input()) {
        let mut model = TallyModel::default();
        for c in input {
            update(&mut model, c);
            if !matches!(model.mode, Mode::Normal) {
                prop_assert!(model.selected.is_some());
            }
        }
    }
}
