//! Write Path
//!
//! Append, streamed append, delete and overwrite. Every public method here
//! takes the exclusive guard for its whole duration.

use std::io::{ErrorKind, Read};

use crate::error::{FlatError, Result};
use crate::record::{
    encode_record, encode_record_head, total_length, DELETED, EMPTY_CONTENT_SENTINEL, LEN_SIZE,
    RECORD_OVERHEAD, STREAM_CHUNK_SIZE,
};

use super::{Engine, StoreState};

impl Engine {
    /// Append a new entry
    ///
    /// Steps:
    /// 1. Acquire write lock
    /// 2. Reject a live name with `NameExists`
    /// 3. Reserve space (`InsufficientSpace` leaves everything unchanged)
    /// 4. Write the record, index it, persist the cursor
    pub fn append(&self, name: &str, content: &[u8]) -> Result<()> {
        let mut state = self.state.write();

        let offset = state.append_record(name, content)?;
        self.record_mutation(&mut state)?;

        tracing::debug!(
            "Appended {:?} ({} bytes) at offset {}",
            name,
            content.len(),
            offset
        );
        Ok(())
    }

    /// Append an entry whose length may not be known up front
    ///
    /// `declared_len` is the length the source reported, if any; when known
    /// and too large the call fails before anything is written. The source is
    /// consumed in `STREAM_CHUNK_SIZE` chunks, each checked against the space
    /// left. If a chunk does not fit (or the source fails) the cursor goes
    /// back to where it was and the name is never indexed. Bytes already
    /// written for the aborted record are not zeroed.
    ///
    /// Returns the number of content bytes stored (4 for an empty source).
    pub fn append_from_stream<R: Read>(
        &self,
        name: &str,
        declared_len: Option<u64>,
        mut source: R,
    ) -> Result<u64> {
        let mut state = self.state.write();

        if state.index.contains(name) {
            return Err(FlatError::NameExists(name.to_string()));
        }

        if let Some(len) = declared_len {
            let content_len = if len == 0 {
                EMPTY_CONTENT_SENTINEL.len() as u64
            } else {
                len
            };
            state
                .allocator
                .ensure(RECORD_OVERHEAD as u64 + name.len() as u64 + content_len)?;
        }

        let start = state.allocator.cursor();
        match state.stream_record(name, &mut source) {
            Ok((offset, written)) => {
                self.record_mutation(&mut state)?;
                tracing::debug!(
                    "Streamed {:?} ({} bytes) at offset {}",
                    name,
                    written,
                    offset
                );
                Ok(written)
            }
            Err(e) => {
                let orphaned = state.allocator.cursor() - start;
                state.allocator.rollback(start);

                // Report the whole record attempted against the space left after rollback
                let e = match e {
                    FlatError::InsufficientSpace { requested, .. } => {
                        FlatError::InsufficientSpace {
                            requested: orphaned as u64 + requested,
                            available: state.allocator.available(),
                        }
                    }
                    other => other,
                };

                tracing::warn!(
                    "Streamed write of {:?} aborted after {} bytes: {}",
                    name,
                    orphaned,
                    e
                );
                Err(e)
            }
        }
    }

    /// Delete an entry
    ///
    /// Flips the tombstone byte in place; the record stays on disk until
    /// the next compaction.
    pub fn delete(&self, name: &str) -> Result<()> {
        let mut state = self.state.write();

        let offset = state.tombstone(name)?;
        self.record_mutation(&mut state)?;

        tracing::debug!("Deleted {:?} (record at offset {})", name, offset);
        Ok(())
    }

    /// Replace an entry's content, creating it if absent
    ///
    /// Delete and append happen under one exclusive guard. The old record's
    /// space is never reused: the new record always goes at the cursor and
    /// the old one becomes dead space until compaction. Space is checked
    /// first so that a failed overwrite leaves the old entry intact.
    pub fn overwrite(&self, name: &str, content: &[u8]) -> Result<()> {
        let mut state = self.state.write();

        state.allocator.ensure(total_length(name, content))?;

        match state.tombstone(name) {
            Ok(_) | Err(FlatError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        let offset = state.append_record(name, content)?;
        self.record_mutation(&mut state)?;

        tracing::debug!(
            "Overwrote {:?} ({} bytes) at offset {}",
            name,
            content.len(),
            offset
        );
        Ok(())
    }
}

impl StoreState {
    /// Write one complete record at the cursor and index it
    pub(super) fn append_record(&mut self, name: &str, content: &[u8]) -> Result<u32> {
        if self.index.contains(name) {
            return Err(FlatError::NameExists(name.to_string()));
        }

        let start = self.allocator.cursor();
        let offset = self.allocator.reserve(total_length(name, content))?;

        let record = encode_record(name, content);
        let written = self
            .file
            .write_at(offset as u64, &record)
            .and_then(|_| self.file.write_header(&self.allocator.header()));
        if let Err(e) = written {
            self.allocator.rollback(start);
            return Err(e);
        }

        self.index.put(name, offset);
        Ok(offset)
    }

    /// Mark the live record for `name` deleted and drop it from the Index
    pub(super) fn tombstone(&mut self, name: &str) -> Result<u32> {
        let offset = self
            .index
            .get(name)
            .ok_or_else(|| FlatError::NotFound(name.to_string()))?;

        self.file.write_at(offset as u64, &[DELETED])?;
        self.index.remove(name);
        self.compaction_pending = true;
        Ok(offset)
    }

    /// Body of `append_from_stream`; the caller rolls back the cursor on error
    fn stream_record<R: Read>(&mut self, name: &str, source: &mut R) -> Result<(u32, u64)> {
        // Tombstone, name and a zero content length placeholder
        let head = encode_record_head(name);
        let offset = self.allocator.reserve(head.len() as u64)?;
        self.file.write_at(offset as u64, &head)?;
        let len_offset = offset as u64 + head.len() as u64 - LEN_SIZE as u64;

        let mut chunk = [0u8; STREAM_CHUNK_SIZE];
        let mut written: u64 = 0;
        loop {
            let n = fill_chunk(source, &mut chunk)?;
            if n == 0 {
                break;
            }
            let at = self.allocator.reserve(n as u64)?;
            self.file.write_at(at as u64, &chunk[..n])?;
            written += n as u64;
        }

        if written == 0 {
            let at = self.allocator.reserve(EMPTY_CONTENT_SENTINEL.len() as u64)?;
            self.file.write_at(at as u64, &EMPTY_CONTENT_SENTINEL)?;
            written = EMPTY_CONTENT_SENTINEL.len() as u64;
        }

        // Bounded by the capacity, which is a u32
        self.file.write_at(len_offset, &(written as u32).to_be_bytes())?;
        self.file.write_header(&self.allocator.header())?;

        self.index.put(name, offset);
        Ok((offset, written))
    }
}

/// Read until `chunk` is full or the source is exhausted
fn fill_chunk<R: Read>(source: &mut R, chunk: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < chunk.len() {
        match source.read(&mut chunk[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(FlatError::Io(e)),
        }
    }
    Ok(filled)
}
