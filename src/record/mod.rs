//! Record Codec Module
//!
//! Binary layout of the backing store: one fixed header followed by a log
//! of length-prefixed records. Pure encode/decode, no file I/O beyond the
//! generic `Read` used by `read_head`.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (8 bytes)                                        │
//! │   Capacity: u32 (4) | Cursor: u32 (4)                   │
//! ├─────────────────────────────────────────────────────────┤
//! │ Record 1                                                │
//! │ ┌──────────┬─────────┬──────┬────────────┬───────────┐  │
//! │ │ Tomb (1) │ NLen(4) │ Name │ CLen (4)   │ Content   │  │
//! │ └──────────┴─────────┴──────┴────────────┴───────────┘  │
//! │ ... repeated up to Cursor ...                           │
//! ├─────────────────────────────────────────────────────────┤
//! │ Free space (Cursor .. Capacity)                         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are big-endian. Empty content is stored as the four bytes
//! `FF FF FF FF` with `CLen = 4`.

mod entry;
mod header;

pub use entry::{
    content_on_disk, encode_record, encode_record_head, encode_record_into,
    read_head, total_length, Record, RecordHead,
};
pub use header::Header;

// =============================================================================
// Shared Constants
// =============================================================================

/// Size of the store header: Capacity (4) + Cursor (4)
pub const HEADER_SIZE: u32 = 8;

/// Fixed per-record overhead: Tombstone (1) + NameLen (4) + ContentLen (4)
pub const RECORD_OVERHEAD: u32 = 9;

/// Size of the tombstone flag plus the name length field
pub(crate) const HEAD_PREFIX_SIZE: usize = 5;

/// Size of a length field
pub(crate) const LEN_SIZE: usize = 4;

/// Tombstone byte of a live record
pub const LIVE: u8 = 0;

/// Tombstone byte of a deleted record
pub const DELETED: u8 = 1;

/// On-disk content of a record whose logical content is empty (-1 as i32)
pub const EMPTY_CONTENT_SENTINEL: [u8; 4] = (-1i32).to_be_bytes();

/// Chunk size used when a record is appended from a stream
pub const STREAM_CHUNK_SIZE: usize = 512;
