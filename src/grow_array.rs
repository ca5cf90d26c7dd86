//! GrowArray: growable homogeneous array with capacity doubling.
//!
//! The C original hid a `{len, cap}` header before the data pointer and
//! asked callers to carry the element size to every call. Both patterns
//! are replaced by a type-parameterized struct that owns its buffer;
//! the compiler carries the element size and the borrow checker makes
//! relocation-on-growth impossible to observe through a stale pointer.
//!
//! Growth reallocates, so any reference into the buffer is invalidated
//! by the next push. That sharp edge is inherited from the original and
//! kept; it simply surfaces as a borrow error instead of a dangling
//! pointer.

use core::ops::{Deref, DerefMut};

use crate::error::AllocError;

const DEFAULT_CAPACITY: usize = 4;

pub struct GrowArray<T> {
    buf: Vec<T>,
}

impl<T> GrowArray<T> {
    /// Create an array with the default capacity of 4 elements.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Create an array with the given capacity; 0 is normalized to 4.
    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)?;
        Ok(Self { buf })
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Allocated element slots. Never shrinks.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Append `value`, doubling the capacity first when full (new
    /// capacity `max(4, capacity * 2)`).
    ///
    /// Lossy-failure policy, reproduced from the original: if the
    /// reallocation fails the element is silently dropped and the array
    /// keeps its prior buffer, length, and capacity. Nothing else is
    /// lost and the array remains fully usable.
    pub fn push(&mut self, value: T) {
        if self.buf.len() == self.buf.capacity() {
            let target = (self.buf.capacity() * 2).max(DEFAULT_CAPACITY);
            if self.buf.try_reserve_exact(target - self.buf.len()).is_err() {
                return;
            }
        }
        self.buf.push(value);
    }

    /// Remove and return the last element, or `T::default()` (the zero
    /// value) when the array is empty.
    pub fn pop(&mut self) -> T
    where
        T: Default,
    {
        self.buf.pop().unwrap_or_default()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.buf
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.buf
    }
}

impl<T> Default for GrowArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for GrowArray<T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        &self.buf
    }
}

impl<T> DerefMut for GrowArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.buf
    }
}
