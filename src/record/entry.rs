//! Log Records
//!
//! Encoding and decoding of individual records.
//!
//! ```text
//! [tombstone u8][name_len u32][name][content_len u32][content]
//! ```

use std::io::{ErrorKind, Read};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FlatError, Result};

use super::{
    DELETED, EMPTY_CONTENT_SENTINEL, HEAD_PREFIX_SIZE, LEN_SIZE, LIVE, RECORD_OVERHEAD,
};

/// A fully decoded record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Tombstone flag
    pub deleted: bool,
    /// Entry name
    pub name: String,
    /// Content exactly as stored (the empty sentinel is not translated)
    pub content: Vec<u8>,
}

/// Everything in a record except its content bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHead {
    pub deleted: bool,
    pub name: String,
    pub content_len: u32,
}

impl RecordHead {
    /// Size of the whole record on disk
    pub fn total_length(&self) -> u64 {
        RECORD_OVERHEAD as u64 + self.name.len() as u64 + self.content_len as u64
    }
}

/// The bytes actually written for `content`
pub fn content_on_disk(content: &[u8]) -> &[u8] {
    if content.is_empty() {
        &EMPTY_CONTENT_SENTINEL
    } else {
        content
    }
}

/// Exact number of bytes `encode_record(name, content)` produces
pub fn total_length(name: &str, content: &[u8]) -> u64 {
    RECORD_OVERHEAD as u64 + name.len() as u64 + content_on_disk(content).len() as u64
}

/// Encode a live record
///
/// Callers check `total_length` against the store capacity first, so both
/// lengths fit in a `u32`.
pub fn encode_record(name: &str, content: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(total_length(name, content) as usize);
    encode_record_into(&mut buf, name, content_on_disk(content));
    buf.freeze()
}

/// Append a live record holding `stored` verbatim to `buf`
///
/// No sentinel substitution happens here: `stored` is written exactly as
/// given, including a zero length, so records read back from disk keep
/// their size when copied.
pub fn encode_record_into(buf: &mut BytesMut, name: &str, stored: &[u8]) {
    buf.put_u8(LIVE);
    buf.put_u32(name.len() as u32);
    buf.put_slice(name.as_bytes());
    buf.put_u32(stored.len() as u32);
    buf.put_slice(stored);
}

/// Encode the head of a streamed record with a zero content length placeholder
pub fn encode_record_head(name: &str) -> Bytes {
    let mut buf = BytesMut::with_capacity(RECORD_OVERHEAD as usize + name.len());
    buf.put_u8(LIVE);
    buf.put_u32(name.len() as u32);
    buf.put_slice(name.as_bytes());
    buf.put_u32(0);
    buf.freeze()
}

/// Read a record head at `offset` from a reader positioned there
///
/// `end` is the store cursor: a record whose declared lengths cross it is
/// corrupt. Content bytes are left unread.
pub fn read_head<R: Read>(reader: &mut R, offset: u32, end: u32) -> Result<RecordHead> {
    let start = offset as u64;
    let end = end as u64;

    if start + HEAD_PREFIX_SIZE as u64 > end {
        return Err(FlatError::corrupt(format!(
            "record at offset {} truncated by cursor {}",
            offset, end
        )));
    }

    let mut prefix = [0u8; HEAD_PREFIX_SIZE];
    read_exact_at(reader, &mut prefix, offset)?;
    let mut buf = &prefix[..];
    let deleted = decode_tombstone(buf.get_u8())?;
    let name_len = buf.get_u32();

    let name_end = start + HEAD_PREFIX_SIZE as u64 + name_len as u64;
    if name_end + LEN_SIZE as u64 > end {
        return Err(FlatError::corrupt(format!(
            "record at offset {}: name length {} runs past cursor {}",
            offset, name_len, end
        )));
    }

    let mut name = vec![0u8; name_len as usize];
    read_exact_at(reader, &mut name, offset)?;

    let mut len_bytes = [0u8; LEN_SIZE];
    read_exact_at(reader, &mut len_bytes, offset)?;
    let content_len = (&len_bytes[..]).get_u32();

    if name_end + LEN_SIZE as u64 + content_len as u64 > end {
        return Err(FlatError::corrupt(format!(
            "record at offset {}: content length {} runs past cursor {}",
            offset, content_len, end
        )));
    }

    Ok(RecordHead {
        deleted,
        name: decode_name(name)?,
        content_len,
    })
}

// =============================================================================
// Private Helpers
// =============================================================================

fn decode_tombstone(byte: u8) -> Result<bool> {
    match byte {
        LIVE => Ok(false),
        DELETED => Ok(true),
        other => Err(FlatError::corrupt(format!(
            "invalid tombstone byte 0x{:02x}",
            other
        ))),
    }
}

fn decode_name(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| FlatError::corrupt(format!("name is not UTF-8: {}", e)))
}

/// `read_exact` where a short file means corruption rather than plain I/O failure
fn read_exact_at<R: Read>(reader: &mut R, buf: &mut [u8], offset: u32) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            FlatError::corrupt(format!(
                "backing file ends inside record at offset {}",
                offset
            ))
        } else {
            FlatError::Io(e)
        }
    })
}
