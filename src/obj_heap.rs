//! ObjHeap: refcounted opaque payloads behind generational handles.
//!
//! The C original placed a `{tag, flags, refcount}` header immediately
//! before each payload and recovered it by fixed negative offset from
//! the payload pointer. Here header and payload live together in an
//! arena slot and the caller holds a small generational [`ObjHandle`]
//! instead of a raw pointer. A handle whose object has been destroyed
//! simply stops resolving, so use-after-destroy and double-destroy are
//! no-ops rather than undefined behavior.

use slotmap::{DefaultKey, Key, SlotMap};

use crate::error::AllocError;
use crate::ident_hash_map::Identity;

/// Handle to an object in an [`ObjHeap`].
///
/// Copyable and cheap; generational, so it never aliases a later object
/// that reuses the same physical slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObjHandle(DefaultKey);

impl ObjHandle {
    fn new(k: DefaultKey) -> Self {
        ObjHandle(k)
    }
    fn raw_handle(&self) -> DefaultKey {
        self.0
    }
}

/// Handles carry a stable per-process identity, so they can key an
/// `IdentHashMap` directly (e.g. a map of object handles to metadata).
impl Identity for ObjHandle {
    fn ident(self) -> u64 {
        self.0.data().as_ffi()
    }
}

struct Obj {
    tag: u32,
    flags: u32,
    refcount: u64,
    payload: Box<[u8]>,
}

/// Result of returning a reference via [`ObjHeap::decref`].
#[derive(Debug, Eq, PartialEq)]
pub enum DecRef {
    /// The object still has outstanding references (or the handle was
    /// stale, or the count was already zero; both are benign no-ops).
    Live,
    /// This call observed the 1→0 transition; the destructor (if any)
    /// ran and the object's storage was released.
    Destroyed,
}

/// Arena of manually refcounted objects with opaque byte payloads.
///
/// Reference counts only move through [`incref`](Self::incref) and
/// [`decref`](Self::decref); the transition to zero destroys the object
/// exactly once. Incrementing has no saturation check: keeping the
/// count below `u64::MAX` is the caller's responsibility, matching the
/// original contract.
pub struct ObjHeap {
    slots: SlotMap<DefaultKey, Obj>,
}

impl ObjHeap {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }

    /// Number of live objects in the heap.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Allocate an object with a zero-initialized payload of
    /// `payload_size` bytes and the given header fields.
    ///
    /// The refcount starts at `initial_refcount` (commonly 1). An
    /// object allocated with a zero initial count is already dead to
    /// `decref` and only reclaimed when the heap is dropped.
    pub fn alloc(
        &mut self,
        payload_size: usize,
        tag: u32,
        flags: u32,
        initial_refcount: u64,
    ) -> Result<ObjHandle, AllocError> {
        let mut buf: Vec<u8> = Vec::new();
        buf.try_reserve_exact(payload_size)?;
        buf.resize(payload_size, 0);
        let k = self.slots.insert(Obj {
            tag,
            flags,
            refcount: initial_refcount,
            payload: buf.into_boxed_slice(),
        });
        Ok(ObjHandle::new(k))
    }

    /// Increment the refcount. No-op on a stale handle.
    pub fn incref(&mut self, h: ObjHandle) {
        if let Some(obj) = self.slots.get_mut(h.raw_handle()) {
            obj.refcount += 1;
        }
    }

    /// Decrement the refcount, destroying the object on the transition
    /// to zero. Stale handles and already-zero counts are no-ops.
    pub fn decref(&mut self, h: ObjHandle) -> DecRef {
        self.decref_with(h, |_| {})
    }

    /// Like [`decref`](Self::decref), but runs `destroy` with the
    /// payload when this call observes the transition to zero.
    ///
    /// The callback receives the payload bytes, never the header; the
    /// heap releases the storage after the callback returns, which is
    /// why the callback only gets a borrowed slice.
    pub fn decref_with<F>(&mut self, h: ObjHandle, destroy: F) -> DecRef
    where
        F: FnOnce(&mut [u8]),
    {
        let now_zero = match self.slots.get_mut(h.raw_handle()) {
            None => return DecRef::Live,
            Some(obj) => {
                if obj.refcount == 0 {
                    // Defensive: never underflow, matching the original.
                    return DecRef::Live;
                }
                obj.refcount -= 1;
                obj.refcount == 0
            }
        };
        if !now_zero {
            return DecRef::Live;
        }
        match self.slots.remove(h.raw_handle()) {
            Some(mut obj) => {
                destroy(&mut obj.payload);
                DecRef::Destroyed
            }
            None => DecRef::Live,
        }
    }

    /// Whether the handle refers to a live object.
    pub fn contains(&self, h: ObjHandle) -> bool {
        self.slots.contains_key(h.raw_handle())
    }

    pub fn data(&self, h: ObjHandle) -> Option<&[u8]> {
        self.slots.get(h.raw_handle()).map(|o| &*o.payload)
    }

    pub fn data_mut(&mut self, h: ObjHandle) -> Option<&mut [u8]> {
        self.slots.get_mut(h.raw_handle()).map(|o| &mut *o.payload)
    }

    pub fn tag(&self, h: ObjHandle) -> Option<u32> {
        self.slots.get(h.raw_handle()).map(|o| o.tag)
    }

    pub fn flags(&self, h: ObjHandle) -> Option<u32> {
        self.slots.get(h.raw_handle()).map(|o| o.flags)
    }

    /// Overwrite the flags bitset. Returns false on a stale handle.
    pub fn set_flags(&mut self, h: ObjHandle, flags: u32) -> bool {
        match self.slots.get_mut(h.raw_handle()) {
            Some(obj) => {
                obj.flags = flags;
                true
            }
            None => false,
        }
    }

    /// Current refcount, mainly for diagnostics and tests.
    pub fn refcount(&self, h: ObjHandle) -> Option<u64> {
        self.slots.get(h.raw_handle()).map(|o| o.refcount)
    }
}

impl Default for ObjHeap {
    fn default() -> Self {
        Self::new()
    }
}
