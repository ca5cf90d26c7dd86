//! IdentHashMap: open-addressing hash map keyed by identity, with
//! explicit tombstones.
//!
//! Keys are compared and hashed by a raw `u64` identity (typically an
//! address), never by pointed-to contents. The map stores keys and
//! values opaquely: it never dereferences either, and dropping the map
//! never frees caller-owned memory reachable through it.
//!
//! Slot discipline
//! - Each slot is `Empty`, `Used`, or `Deleted` (tombstone).
//! - Lookups probe linearly with wraparound and stop at an empty slot
//!   or after a full traversal.
//! - Inserts probe past used and deleted slots; a matching used slot is
//!   overwritten in place, otherwise the entry lands on the first empty
//!   slot. Tombstones are never converted back to used by an insert;
//!   they are reclaimed only by the full rehash that runs on growth.
//! - Growth runs before any insert that would violate the load bound:
//!   the table doubles when `(len + tombstones + 1) * 2 >= capacity`,
//!   counting the incoming entry. Tombstones count toward the trigger
//!   because they consume empty slots until a rehash; this keeps
//!   `len * 2 < capacity` strictly true after every insert and
//!   guarantees every probe loop terminates.

use crate::error::AllocError;

/// Identity of a key: a raw `u64` fed to the hash mix.
///
/// Equal keys must produce equal identities. Implementations exist for
/// thin raw pointers, `NonNull`, plain integers, and `ObjHandle`.
pub trait Identity: Copy + Eq {
    fn ident(self) -> u64;
}

impl<T> Identity for *const T {
    fn ident(self) -> u64 {
        self as usize as u64
    }
}

impl<T> Identity for *mut T {
    fn ident(self) -> u64 {
        self as usize as u64
    }
}

impl<T> Identity for core::ptr::NonNull<T> {
    fn ident(self) -> u64 {
        self.as_ptr() as usize as u64
    }
}

impl Identity for usize {
    fn ident(self) -> u64 {
        self as u64
    }
}

impl Identity for u64 {
    fn ident(self) -> u64 {
        self
    }
}

/// Fixed 64-bit avalanche mix applied to key identities.
///
/// Deterministic within a process; no stability guarantee across
/// processes or versions.
pub(crate) fn mix64(mut v: u64) -> u64 {
    v = (!v).wrapping_add(v << 21);
    v ^= v >> 24;
    v = v.wrapping_add(v << 3).wrapping_add(v << 8);
    v ^= v >> 14;
    v = v.wrapping_add(v << 2).wrapping_add(v << 4);
    v ^= v >> 28;
    v.wrapping_add(v << 31)
}

#[derive(Debug)]
enum Slot<K, V> {
    Empty,
    Used { key: K, value: V },
    Deleted,
}

const DEFAULT_CAPACITY: usize = 16;

fn probe_start(ident: u64, cap: usize) -> usize {
    (mix64(ident) % cap as u64) as usize
}

fn new_table<K, V>(cap: usize) -> Result<Vec<Slot<K, V>>, AllocError> {
    let mut table = Vec::new();
    table.try_reserve_exact(cap)?;
    table.resize_with(cap, || Slot::Empty);
    Ok(table)
}

// During a rehash every slot is Empty or Used, so probing over used
// slots alone terminates.
fn rehash_insert<K: Identity, V>(table: &mut [Slot<K, V>], key: K, value: V) {
    let cap = table.len();
    let mut idx = probe_start(key.ident(), cap);
    while let Slot::Used { .. } = table[idx] {
        idx = (idx + 1) % cap;
    }
    table[idx] = Slot::Used { key, value };
}

pub struct IdentHashMap<K: Identity, V> {
    slots: Vec<Slot<K, V>>,
    len: usize,        // used slots only; tombstones excluded
    tombstones: usize, // deleted slots awaiting the next rehash
}

impl<K: Identity, V> IdentHashMap<K, V> {
    /// Create a map with the default capacity of 16 slots.
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(DEFAULT_CAPACITY);
        slots.resize_with(DEFAULT_CAPACITY, || Slot::Empty);
        Self {
            slots,
            len: 0,
            tombstones: 0,
        }
    }

    /// Create a map with the given slot capacity; 0 is normalized to 16.
    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };
        Ok(Self {
            slots: new_table(capacity)?,
            len: 0,
            tombstones: 0,
        })
    }

    /// Number of used slots (tombstones excluded).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total slot capacity of the table.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Insert or overwrite the value for `key`.
    ///
    /// Growth runs first when the load check fires; if that allocation
    /// fails the put is aborted and the map is unchanged.
    pub fn put(&mut self, key: K, value: V) -> Result<(), AllocError> {
        // Loops only for tiny user-chosen capacities; one doubling
        // suffices from the default table size.
        while (self.len + self.tombstones + 1) * 2 >= self.slots.len() {
            self.grow()?;
        }
        let cap = self.slots.len();
        let start = probe_start(key.ident(), cap);
        let mut idx = start;
        loop {
            match &self.slots[idx] {
                Slot::Used { key: k, .. } if *k == key => break,
                Slot::Used { .. } | Slot::Deleted => {
                    idx = (idx + 1) % cap;
                    // The growth check above guarantees an empty slot.
                    debug_assert!(idx != start, "probe wrapped around a full table");
                }
                Slot::Empty => break,
            }
        }
        match &mut self.slots[idx] {
            Slot::Used { value: v, .. } => *v = value,
            slot => {
                *slot = Slot::Used { key, value };
                self.len += 1;
            }
        }
        Ok(())
    }

    pub fn get(&self, key: K) -> Option<&V> {
        let cap = self.slots.len();
        let start = probe_start(key.ident(), cap);
        let mut idx = start;
        loop {
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Used { key: k, value } if *k == key => return Some(value),
                _ => {
                    idx = (idx + 1) % cap;
                    if idx == start {
                        return None;
                    }
                }
            }
        }
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let cap = self.slots.len();
        let start = probe_start(key.ident(), cap);
        let mut idx = start;
        loop {
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Used { key: k, .. } if *k == key => break,
                _ => {
                    idx = (idx + 1) % cap;
                    if idx == start {
                        return None;
                    }
                }
            }
        }
        match &mut self.slots[idx] {
            Slot::Used { value, .. } => Some(value),
            _ => unreachable!("probe landed on a used slot"),
        }
    }

    pub fn contains_key(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Remove `key`, returning its value. The slot becomes a tombstone
    /// that keeps probe chains intact until the next rehash.
    pub fn remove(&mut self, key: K) -> Option<V> {
        let cap = self.slots.len();
        let start = probe_start(key.ident(), cap);
        let mut idx = start;
        loop {
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Used { key: k, .. } if *k == key => break,
                _ => {
                    idx = (idx + 1) % cap;
                    if idx == start {
                        return None;
                    }
                }
            }
        }
        match core::mem::replace(&mut self.slots[idx], Slot::Deleted) {
            Slot::Used { value, .. } => {
                self.len -= 1;
                self.tombstones += 1;
                Some(value)
            }
            _ => unreachable!("probe landed on a used slot"),
        }
    }

    /// Double the table and rehash every used entry. Tombstones are not
    /// carried over; this is the mechanism that reclaims deleted slots.
    fn grow(&mut self) -> Result<(), AllocError> {
        let new_cap = self.slots.len() * 2;
        let table = new_table(new_cap)?;
        // Infallible from here on: the new table is fully allocated.
        let old = core::mem::replace(&mut self.slots, table);
        for slot in old {
            if let Slot::Used { key, value } = slot {
                rehash_insert(&mut self.slots, key, value);
            }
        }
        self.tombstones = 0;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn tombstones(&self) -> usize {
        self.tombstones
    }
}

impl<K: Identity, V> Default for IdentHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
