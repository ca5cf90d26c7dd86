//! cyon-core: single-threaded data-structure primitives for the Cyon
//! runtime. A refcounted object heap, an identity-keyed hash map, a
//! growable array, and a byte string builder.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: replace the C runtime's pointer-arithmetic primitives with
//!   safe, independently verifiable components that keep the original
//!   semantics (probe sequences, tombstone bookkeeping, load-factor
//!   rehashing, refcount lifecycle, relocation on growth).
//! - Components (siblings; none depends on another at runtime):
//!   - ObjHeap: arena of refcounted opaque payloads behind generational
//!     handles; replaces header-before-payload back-offset addressing.
//!     The 1→0 transition destroys the object exactly once, enforced by
//!     the arena rather than by caller convention.
//!   - IdentHashMap<K, V>: open-addressing table keyed by identity
//!     (a raw `u64` derived from the key, never the pointed-to
//!     contents), with explicit empty/used/deleted slots. Tombstones
//!     are reclaimed only by a full rehash during growth.
//!   - GrowArray<T>: growable array with capacity doubling and a
//!     documented lossy push on allocation failure.
//!   - ByteBuilder: append-only byte buffer that stays
//!     terminator-appended after every successful append.
//!
//! Constraints
//! - Single-threaded: no internal locking anywhere; exclusive ownership
//!   is expressed through `&mut self`. Concurrent mutation of one
//!   instance must be prevented externally.
//! - Allocation failure is the only hard error, reported synchronously
//!   as [`AllocError`]; invalid arguments (stale handles, absent keys)
//!   are benign no-ops.
//! - Growth may reallocate: any reference previously obtained into a
//!   `GrowArray` or `ByteBuilder` buffer is invalidated by the next
//!   growing operation. The borrow checker enforces this; the contract
//!   is kept, not papered over with extra indirection.
//!
//! Notes and non-goals
//! - No thread safety, no persistence, no iteration-order guarantees.
//! - Keys and values in `IdentHashMap` are opaque to the map: it never
//!   dereferences them and never frees caller-owned memory.
//! - The identity hash is a fixed 64-bit avalanche mix; it is
//!   deterministic within a process and carries no cross-process
//!   stability guarantee.

mod byte_builder;
mod error;
mod grow_array;
mod ident_hash_map;
mod ident_hash_map_proptest;
mod obj_heap;

// Public surface
pub use byte_builder::ByteBuilder;
pub use error::AllocError;
pub use grow_array::GrowArray;
pub use ident_hash_map::{IdentHashMap, Identity};
pub use obj_heap::{DecRef, ObjHandle, ObjHeap};
