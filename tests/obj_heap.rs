// ObjHeap lifecycle tests: the destructor must run exactly once, on
// the decrement that reaches zero, for any initial refcount and any
// number of extra increments.

use cyon_core::{DecRef, ObjHeap};
use proptest::prelude::*;
use std::cell::Cell;

/// For payload sizes and initial refcounts n >= 1: incref k times then
/// decref n + k times invokes the destructor exactly once, on the final
/// call, and never before.
#[test]
fn destructor_exactly_once_grid() {
    for payload_size in [0usize, 1, 8, 64] {
        for n in 1u64..=3 {
            for k in 0u64..=3 {
                let mut heap = ObjHeap::new();
                let h = heap.alloc(payload_size, 0, 0, n).unwrap();
                for _ in 0..k {
                    heap.incref(h);
                }

                let calls = Cell::new(0u32);
                let total = n + k;
                for i in 1..=total {
                    let r = heap.decref_with(h, |_| calls.set(calls.get() + 1));
                    if i < total {
                        assert_eq!(r, DecRef::Live, "size {payload_size} n {n} k {k} call {i}");
                        assert_eq!(calls.get(), 0);
                    } else {
                        assert_eq!(r, DecRef::Destroyed);
                        assert_eq!(calls.get(), 1);
                    }
                }
                assert!(!heap.contains(h));

                // Extra decrefs after destruction stay silent.
                let r = heap.decref_with(h, |_| calls.set(calls.get() + 1));
                assert_eq!(r, DecRef::Live);
                assert_eq!(calls.get(), 1);
            }
        }
    }
}

/// The destructor observes the payload contents as last written, and
/// receives the payload, not any header bookkeeping.
#[test]
fn destructor_sees_final_payload() {
    let mut heap = ObjHeap::new();
    let h = heap.alloc(4, 9, 0, 1).unwrap();
    heap.data_mut(h).unwrap().copy_from_slice(&[1, 2, 3, 4]);

    let seen = Cell::new(None);
    let r = heap.decref_with(h, |payload| {
        seen.set(Some(payload.to_vec()));
    });
    assert_eq!(r, DecRef::Destroyed);
    assert_eq!(seen.take().as_deref(), Some(&[1u8, 2, 3, 4][..]));
}

/// Interleaved allocations: destroying one object never disturbs the
/// others' headers, payloads, or counts.
#[test]
fn independent_lifecycles() {
    let mut heap = ObjHeap::new();
    let a = heap.alloc(2, 1, 0, 1).unwrap();
    let b = heap.alloc(2, 2, 0, 2).unwrap();
    heap.data_mut(a).unwrap()[0] = 0xAA;
    heap.data_mut(b).unwrap()[0] = 0xBB;

    assert_eq!(heap.decref(a), DecRef::Destroyed);
    assert_eq!(heap.data(b).unwrap()[0], 0xBB);
    assert_eq!(heap.refcount(b), Some(2));
    assert_eq!(heap.tag(b), Some(2));

    assert_eq!(heap.decref(b), DecRef::Live);
    assert_eq!(heap.decref(b), DecRef::Destroyed);
    assert!(heap.is_empty());
}

proptest! {
    /// Property: under random interleavings of incref/decref across
    /// several objects, each destructor runs exactly once, exactly when
    /// the per-object balance hits zero.
    #[test]
    fn prop_balance_drives_destruction(
        objs in 1usize..=4,
        ops in proptest::collection::vec((0usize..4, prop::bool::ANY), 1..120)
    ) {
        let mut heap = ObjHeap::new();
        let mut handles = Vec::new();
        let mut counts = Vec::new();
        for i in 0..objs {
            handles.push(heap.alloc(i, 0, 0, 1).unwrap());
            counts.push(1u64);
        }
        let destroyed = std::rc::Rc::new(Cell::new(0usize));

        for (raw_i, inc) in ops {
            let i = raw_i % objs;
            let h = handles[i];
            if inc {
                heap.incref(h);
                if counts[i] > 0 {
                    counts[i] += 1;
                }
            } else {
                let d = destroyed.clone();
                let r = heap.decref_with(h, move |_| d.set(d.get() + 1));
                match counts[i] {
                    0 => prop_assert_eq!(r, DecRef::Live),
                    1 => {
                        prop_assert_eq!(r, DecRef::Destroyed);
                        counts[i] = 0;
                    }
                    _ => {
                        prop_assert_eq!(r, DecRef::Live);
                        counts[i] -= 1;
                    }
                }
            }
            prop_assert_eq!(heap.contains(h), counts[i] > 0);
        }

        let expected_destroyed = counts.iter().filter(|&&c| c == 0).count();
        prop_assert_eq!(destroyed.get(), expected_destroyed);
        prop_assert_eq!(heap.len(), objs - expected_destroyed);
    }
}
