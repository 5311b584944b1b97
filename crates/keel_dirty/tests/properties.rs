//! Property tests for generation rules.

use keel_dirty::{AttributeSet, Change, Tracked};
use proptest::prelude::*;

#[derive(Debug, Clone, PartialEq, AttributeSet)]
struct Row {
    a: i8,
    b: i8,
    c: i8,
}

const NAMES: [&str; 3] = ["a", "b", "c"];

fn arb_writes() -> impl Strategy<Value = Vec<(usize, i8)>> {
    prop::collection::vec((0..NAMES.len(), any::<i8>()), 0..24)
}

fn arb_row() -> impl Strategy<Value = Row> {
    (any::<i8>(), any::<i8>(), any::<i8>()).prop_map(|(a, b, c)| Row { a, b, c })
}

proptest! {
    #[test]
    fn was_is_value_before_first_real_change(start in arb_row(), writes in arb_writes()) {
        let mut row = Tracked::new(start.clone());
        for (index, value) in &writes {
            row.set(NAMES[*index], *value).unwrap();
        }

        for name in NAMES {
            let original = start.read_attribute(name);
            prop_assert_eq!(row.was(name), original);
            if !row.is_changed(name) {
                prop_assert_eq!(row.get(name), original);
            }
        }
    }

    #[test]
    fn commit_moves_changes_to_previous(start in arb_row(), writes in arb_writes()) {
        let mut row = Tracked::new(start);
        for (index, value) in &writes {
            row.set(NAMES[*index], *value).unwrap();
        }

        let before = row.changes();
        row.save();

        prop_assert!(row.changes().is_empty());
        prop_assert_eq!(row.previous_changes(), &before);
    }

    #[test]
    fn rollback_restores_start(start in arb_row(), writes in arb_writes()) {
        let mut row = Tracked::new(start.clone());
        for (index, value) in &writes {
            row.set(NAMES[*index], *value).unwrap();
        }

        row.rollback().unwrap();

        prop_assert_eq!(&*row, &start);
        prop_assert!(!row.has_changes());
    }

    #[test]
    fn reload_keeps_live_values(start in arb_row(), writes in arb_writes()) {
        let mut row = Tracked::new(start);
        for (index, value) in &writes {
            row.set(NAMES[*index], *value).unwrap();
        }
        let live = (*row).clone();

        row.reload();

        prop_assert_eq!(&*row, &live);
        for name in NAMES {
            prop_assert_eq!(row.was(name), live.read_attribute(name));
            prop_assert_eq!(row.change(name), None::<Change<i8>>);
        }
    }
}
