//! Property-based tests for the ordered map
//!
//! These tests use PropTest to check the ordering guarantees against a
//! simple reference model over arbitrary sequences of operations.

use proptest::prelude::*;
use std::collections::HashSet;

use ordered_string_map::OrderedStringMap;

#[derive(Debug, Clone)]
enum Op {
    Set(String, i32),
    Delete(String),
    Reindex,
}

/// Small key space so that updates and deletes hit existing keys often.
fn arb_key() -> impl Strategy<Value = String> {
    "[a-f]{1,2}"
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (arb_key(), any::<i32>()).prop_map(|(k, v)| Op::Set(k, v)),
        2 => arb_key().prop_map(Op::Delete),
        1 => Just(Op::Reindex),
    ]
}

/// Reference model: a vector of keys in recency order.
fn apply(map: &OrderedStringMap<i32>, model: &mut Vec<(String, i32)>, op: &Op) {
    match op {
        Op::Set(key, value) => {
            map.set(key.clone(), *value);
            model.retain(|(k, _)| k != key);
            model.push((key.clone(), *value));
        }
        Op::Delete(key) => {
            map.delete(key);
            model.retain(|(k, _)| k != key);
        }
        Op::Reindex => map.reindex(),
    }
}

proptest! {
    /// Property: after set(k), k is the last key in the order
    #[test]
    fn prop_set_moves_key_last(ops in prop::collection::vec(arb_op(), 0..60), key in arb_key(), value in any::<i32>()) {
        let map = OrderedStringMap::new();
        let mut model = Vec::new();
        for op in &ops {
            apply(&map, &mut model, op);
        }

        map.set(key.clone(), value);

        let order = map.key_order();
        prop_assert_eq!(order.last(), Some(&key));
        prop_assert_eq!(map.get(&key), Some(value));
    }

    /// Property: key order lists every key exactly once and matches len
    #[test]
    fn prop_key_order_is_unique(ops in prop::collection::vec(arb_op(), 0..80)) {
        let map = OrderedStringMap::new();
        let mut model = Vec::new();
        for op in &ops {
            apply(&map, &mut model, op);
        }

        let order = map.key_order();
        let unique: HashSet<&String> = order.iter().collect();
        prop_assert_eq!(unique.len(), order.len());
        prop_assert_eq!(order.len(), map.len());
    }

    /// Property: the map agrees with the reference model after any sequence
    #[test]
    fn prop_matches_reference_model(ops in prop::collection::vec(arb_op(), 0..80)) {
        let map = OrderedStringMap::new();
        let mut model = Vec::new();
        for op in &ops {
            apply(&map, &mut model, op);
        }

        let expected_order: Vec<String> = model.iter().map(|(k, _)| k.clone()).collect();
        prop_assert_eq!(map.key_order(), expected_order);
        for (key, value) in &model {
            prop_assert_eq!(map.get(key), Some(*value));
        }
    }

    /// Property: delete removes the key and shrinks len by at most one
    #[test]
    fn prop_delete_removes(ops in prop::collection::vec(arb_op(), 0..60), key in arb_key()) {
        let map = OrderedStringMap::new();
        let mut model = Vec::new();
        for op in &ops {
            apply(&map, &mut model, op);
        }

        let was_present = map.contains_key(&key);
        let len_before = map.len();

        map.delete(&key);

        prop_assert_eq!(map.get(&key), None);
        prop_assert!(!map.key_order().contains(&key));
        let expected_len = if was_present { len_before - 1 } else { len_before };
        prop_assert_eq!(map.len(), expected_len);
    }

    /// Property: reindex never changes the key order
    #[test]
    fn prop_reindex_preserves_order(ops in prop::collection::vec(arb_op(), 0..80)) {
        let map = OrderedStringMap::new();
        let mut model = Vec::new();
        for op in &ops {
            apply(&map, &mut model, op);
        }

        let before = map.key_order();
        map.reindex();
        prop_assert_eq!(map.key_order(), before);
    }
}
