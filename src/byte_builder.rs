//! ByteBuilder: append-only growable byte buffer.
//!
//! Kept from the original: the buffer is terminator-appended after
//! every successful append, so `len() + 1 <= capacity()` at all times
//! and `as_bytes_with_nul()` is always a valid C-style string view of
//! whatever bytes were appended. Growth doubles the capacity until the
//! requested reservation fits and reallocates once for the final size.

use crate::error::AllocError;

const DEFAULT_CAPACITY: usize = 128;

pub struct ByteBuilder {
    // Holds the appended bytes plus one trailing NUL.
    buf: Vec<u8>,
}

impl ByteBuilder {
    /// Create a builder with the default capacity of 128 bytes.
    pub fn new() -> Self {
        let mut buf = Vec::with_capacity(DEFAULT_CAPACITY);
        buf.push(0);
        Self { buf }
    }

    /// Create a builder with the given byte capacity; 0 is normalized
    /// to 128. The capacity always leaves room for the terminator.
    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)?;
        buf.push(0);
        Ok(Self { buf })
    }

    /// Bytes written, excluding the terminator.
    pub fn len(&self) -> usize {
        self.buf.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocated bytes, including the terminator slot.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Ensure room for `extra` more bytes plus the terminator.
    ///
    /// No-op when `len + extra + 1` already fits; otherwise doubles the
    /// capacity until it does and reallocates once. On failure the
    /// builder is unchanged.
    pub fn reserve(&mut self, extra: usize) -> Result<(), AllocError> {
        let needed = self.len() + extra + 1;
        if needed <= self.buf.capacity() {
            return Ok(());
        }
        let mut new_cap = self.buf.capacity() * 2;
        while new_cap < needed {
            new_cap *= 2;
        }
        self.buf.try_reserve_exact(new_cap - self.buf.len())?;
        Ok(())
    }

    /// Append `text`'s bytes. Fails without mutation if the reservation
    /// fails.
    pub fn append(&mut self, text: &str) -> Result<(), AllocError> {
        self.append_bytes(text.as_bytes())
    }

    /// Append raw bytes and re-terminate.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<(), AllocError> {
        self.reserve(bytes.len())?;
        // Within reserved capacity from here: no reallocation, and the
        // buffer is re-terminated before returning.
        self.buf.pop();
        self.buf.extend_from_slice(bytes);
        self.buf.push(0);
        Ok(())
    }

    /// The appended bytes, without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.buf.len() - 1]
    }

    /// The appended bytes including the trailing NUL.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf
    }
}

impl Default for ByteBuilder {
    fn default() -> Self {
        Self::new()
    }
}
