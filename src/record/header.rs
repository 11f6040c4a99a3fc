//! Store Header
//!
//! The first eight bytes of the backing file.

use bytes::{Buf, BufMut};

use crate::error::{FlatError, Result};

use super::HEADER_SIZE;

/// Capacity and write cursor of a backing store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Total size of the store, immutable after creation
    pub capacity: u32,

    /// Offset of the next free byte
    pub cursor: u32,
}

impl Header {
    /// Header of a freshly created (empty) store
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            cursor: HEADER_SIZE,
        }
    }

    /// Encode to the 8-byte on-disk form
    pub fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        let mut out = [0u8; HEADER_SIZE as usize];
        let mut buf = &mut out[..];
        buf.put_u32(self.capacity);
        buf.put_u32(self.cursor);
        out
    }

    /// Decode and validate a header
    ///
    /// Fails with `CorruptStore` if fewer than 8 bytes are given or the
    /// cursor lies outside `[HEADER_SIZE, capacity]`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE as usize {
            return Err(FlatError::corrupt(format!(
                "header truncated: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut buf = bytes;
        let capacity = buf.get_u32();
        let cursor = buf.get_u32();

        if capacity < HEADER_SIZE {
            return Err(FlatError::corrupt(format!(
                "header capacity {} is smaller than the header itself",
                capacity
            )));
        }
        if cursor < HEADER_SIZE || cursor > capacity {
            return Err(FlatError::corrupt(format!(
                "header cursor {} outside [{}, {}]",
                cursor, HEADER_SIZE, capacity
            )));
        }

        Ok(Self { capacity, cursor })
    }
}
