//! Property-based tests for set/get behaviour.

mod common;

use std::collections::BTreeMap;

use common::{Human, TestStore};
use proptest::prelude::*;

// Every case opens its own file and commits durably, so keep the count low.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn set_then_get_returns_equal_record(
        key in "[a-z]{1,8}:[0-9]{1,4}",
        name in ".{0,32}",
        height in -1.0e12f64..1.0e12f64,
    ) {
        let t = TestStore::new().unwrap();
        let human = Human { name, height };

        t.store.set(&key, &human).unwrap();
        let back: Human = t.store.get(&key).unwrap();

        prop_assert_eq!(back, human);
    }

    #[test]
    fn keys_are_sorted_and_deduplicated(
        entries in proptest::collection::vec(("[a-zA-Z0-9:_-]{1,12}", any::<i64>()), 0..32),
    ) {
        let t = TestStore::new().unwrap();
        let mut expected = BTreeMap::new();
        for (key, value) in &entries {
            t.store.set(key, value).unwrap();
            expected.insert(key.clone(), *value);
        }

        let keys = t.store.keys().unwrap();
        prop_assert_eq!(&keys, &expected.keys().cloned().collect::<Vec<_>>());

        for (key, value) in &expected {
            prop_assert_eq!(t.store.get::<i64>(key).unwrap(), *value);
        }
    }

    #[test]
    fn deleted_keys_are_gone(
        keys in proptest::collection::btree_set("[a-z]{1,6}", 1..16),
    ) {
        let t = TestStore::new().unwrap();
        for key in &keys {
            t.store.set(key, key).unwrap();
        }
        for key in keys.iter().step_by(2) {
            t.store.delete(key).unwrap();
        }

        for (i, key) in keys.iter().enumerate() {
            let result = t.store.get::<String>(key);
            if i % 2 == 0 {
                prop_assert!(result.is_err_and(|e| e.is_not_found()));
            } else {
                prop_assert_eq!(result.unwrap(), key.clone());
            }
        }
    }
}
