//! Space Allocator
//!
//! Capacity accounting for the append-only log.

use crate::error::{FlatError, Result};
use crate::record::{Header, HEADER_SIZE};

/// Tracks total capacity and the next-free-offset cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceAllocator {
    capacity: u32,
    cursor: u32,
}

impl SpaceAllocator {
    /// Allocator for an empty store of `capacity` bytes
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            cursor: HEADER_SIZE,
        }
    }

    /// Allocator resuming from a persisted header
    pub fn from_header(header: Header) -> Self {
        Self {
            capacity: header.capacity,
            cursor: header.cursor,
        }
    }

    /// Header describing the current state
    pub fn header(&self) -> Header {
        Header {
            capacity: self.capacity,
            cursor: self.cursor,
        }
    }

    /// Check that `n` more bytes fit without reserving them
    pub fn ensure(&self, n: u64) -> Result<()> {
        if self.cursor as u64 + n > self.capacity as u64 {
            return Err(FlatError::InsufficientSpace {
                requested: n,
                available: self.available(),
            });
        }
        Ok(())
    }

    /// Reserve `n` bytes, returning the offset they start at
    ///
    /// On failure the cursor is left unchanged.
    pub fn reserve(&mut self, n: u64) -> Result<u32> {
        self.ensure(n)?;
        let offset = self.cursor;
        // ensure() bounds cursor + n by capacity, so this fits in u32
        self.cursor += n as u32;
        Ok(offset)
    }

    /// Move the cursor back to a value saved before a failed write
    pub fn rollback(&mut self, to: u32) {
        debug_assert!(to >= HEADER_SIZE && to <= self.cursor);
        self.cursor = to;
    }

    /// Empty the log
    pub fn reset(&mut self) {
        self.cursor = HEADER_SIZE;
    }

    /// Bytes left between the cursor and the capacity
    pub fn available(&self) -> u32 {
        self.capacity - self.cursor
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }
}
