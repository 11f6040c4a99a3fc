//! Compaction
//!
//! Rewrites the log without tombstoned records.
//!
//! ## Process
//! 1. Take the exclusive guard (the same one every writer uses)
//! 2. Walk live entries in ascending offset order
//! 3. Copy each record's stored bytes into a fresh buffer starting right
//!    after the header, building a new Index as we go
//! 4. Write header + buffer over the file in one pass, truncate, fsync
//! 5. Swap in the new Index and cursor, clear the pending flag

use bytes::{BufMut, BytesMut};

use crate::error::{FlatError, Result};
use crate::index::{Index, SpaceAllocator};
use crate::record::{encode_record_into, Header, HEADER_SIZE};

use super::{Engine, StoreState};

/// Outcome of a compaction pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompactionStats {
    /// Live records rewritten
    pub records_kept: usize,

    /// Bytes returned to the free space
    pub bytes_reclaimed: u64,
}

impl Engine {
    /// Reclaim the space held by tombstoned records
    ///
    /// No-op (all-zero stats) unless a delete or overwrite happened since the
    /// last compaction, or the store was reopened with tombstones in it.
    /// Every previously known offset is invalidated, which is why this runs
    /// under the exclusive guard.
    pub fn compact(&self) -> Result<CompactionStats> {
        let mut state = self.state.write();

        if !state.compaction_pending {
            tracing::debug!("Compaction skipped: no tombstones");
            return Ok(CompactionStats::default());
        }

        let stats = state.compact()?;

        tracing::info!(
            "Compaction kept {} records, reclaimed {} bytes, cursor now {}",
            stats.records_kept,
            stats.bytes_reclaimed,
            state.allocator.cursor()
        );
        Ok(stats)
    }
}

impl StoreState {
    fn compact(&mut self) -> Result<CompactionStats> {
        let capacity = self.allocator.capacity();
        let old_cursor = self.allocator.cursor();

        // Header placeholder, patched once the new cursor is known
        let mut buf = BytesMut::with_capacity(old_cursor as usize);
        buf.put_bytes(0, HEADER_SIZE as usize);

        let mut new_index = Index::new();
        for (name, offset) in self.index.by_offset() {
            let record = self.load_record(offset)?;
            if record.name != name {
                return Err(FlatError::corrupt(format!(
                    "index points {:?} at offset {}, which holds {:?}",
                    name, offset, record.name
                )));
            }

            // Stored bytes are copied as-is, so the rewrite never outgrows the old log
            let new_offset = buf.len() as u32;
            encode_record_into(&mut buf, &record.name, &record.content);
            new_index.put(name, new_offset);
        }

        if buf.len() > old_cursor as usize {
            return Err(FlatError::corrupt(format!(
                "compacted log of {} bytes exceeds the old cursor {}",
                buf.len(),
                old_cursor
            )));
        }

        let header = Header {
            capacity,
            cursor: buf.len() as u32,
        };
        buf[..HEADER_SIZE as usize].copy_from_slice(&header.encode());

        self.file.write_at(0, &buf)?;
        self.file.set_len(header.cursor as u64)?;
        self.file.sync()?;

        let stats = CompactionStats {
            records_kept: new_index.len(),
            bytes_reclaimed: (old_cursor - header.cursor) as u64,
        };

        self.index = new_index;
        self.allocator = SpaceAllocator::from_header(header);
        self.compaction_pending = false;
        self.unsynced_writes = 0;

        Ok(stats)
    }
}
