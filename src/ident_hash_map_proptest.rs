#![cfg(test)]

// Property tests for IdentHashMap kept inside the crate so they can
// check slot-level bookkeeping (tombstone counts) that the public API
// does not expose.

use crate::ident_hash_map::IdentHashMap;
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to
// earlier keys, the pool shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i64),
    Get(usize),
    Remove(usize),
    Contains(usize),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<u64>, Vec<OpI>)> {
    proptest::collection::vec(1u64..1_000_000, 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            (idx.clone(), any::<i64>()).prop_map(|(i, v)| OpI::Put(i, v)),
            idx.clone().prop_map(OpI::Get),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::Contains),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - put/get/remove/contains_key parity with the model after every op.
// - `len * 2 < capacity` after every put (load factor bound).
// - Tombstones grow by one per successful removal, never change on get,
//   and are reset only by the rehash on growth.
// - Every live key remains retrievable with its most recent value.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: IdentHashMap<u64, i64> = IdentHashMap::with_capacity(4).unwrap();
        let mut model: HashMap<u64, i64> = HashMap::new();

        for op in ops {
            let tombs_before = sut.tombstones();
            let cap_before = sut.capacity();
            match op {
                OpI::Put(i, v) => {
                    let k = pool[i];
                    sut.put(k, v).unwrap();
                    model.insert(k, v);
                    prop_assert!(sut.len() * 2 < sut.capacity());
                    if sut.capacity() > cap_before {
                        prop_assert_eq!(sut.tombstones(), 0, "rehash must drop tombstones");
                    } else {
                        prop_assert_eq!(sut.tombstones(), tombs_before, "insert must not touch tombstones");
                    }
                }
                OpI::Get(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.get(k).copied(), model.get(&k).copied());
                    prop_assert_eq!(sut.tombstones(), tombs_before);
                }
                OpI::Remove(i) => {
                    let k = pool[i];
                    let removed = sut.remove(k);
                    prop_assert_eq!(removed, model.remove(&k));
                    if removed.is_some() {
                        prop_assert_eq!(sut.tombstones(), tombs_before + 1);
                    } else {
                        prop_assert_eq!(sut.tombstones(), tombs_before);
                    }
                }
                OpI::Contains(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.contains_key(k), model.contains_key(&k));
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
        }

        // Final sweep: every live key is retrievable at its latest value.
        for (k, v) in &model {
            prop_assert_eq!(sut.get(*k), Some(v));
        }
    }
}
