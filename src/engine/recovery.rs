//! Store Recovery
//!
//! Rebuilds the Index by scanning the log between the header and the cursor.

use crate::error::{FlatError, Result};
use crate::index::Index;
use crate::record::{read_head, Header, HEADER_SIZE};
use crate::storage::BackingFile;

/// Result of a restore scan
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Records indexed as live
    pub live_records: u64,

    /// Tombstoned records encountered
    pub dead_records: u64,

    /// On-disk bytes held by tombstoned records
    pub dead_bytes: u64,
}

/// Scan `[HEADER_SIZE, header.cursor)` and index every live record
///
/// Content bytes are skipped, never read. Fails with `CorruptStore` when a
/// record's lengths cross the cursor, when the file is shorter than the
/// cursor, or when a live name appears twice.
pub(super) fn restore(file: &BackingFile, header: &Header) -> Result<(Index, RecoveryStats)> {
    let mut index = Index::new();
    let mut stats = RecoveryStats::default();

    if header.cursor == HEADER_SIZE {
        return Ok((index, stats));
    }

    let file_len = file.len()?;
    if file_len < header.cursor as u64 {
        return Err(FlatError::corrupt(format!(
            "file is {} bytes but the cursor is at {}",
            file_len, header.cursor
        )));
    }

    file.with_reader(HEADER_SIZE as u64, |reader| {
        let mut offset = HEADER_SIZE;

        while offset < header.cursor {
            let head = read_head(reader, offset, header.cursor)?;
            reader.seek_relative(head.content_len as i64)?;

            let len = head.total_length();
            if head.deleted {
                stats.dead_records += 1;
                stats.dead_bytes += len;
            } else {
                let name = head.name;
                if index.contains(&name) {
                    return Err(FlatError::corrupt(format!(
                        "live name {:?} appears twice (second at offset {})",
                        name, offset
                    )));
                }
                tracing::trace!("Restored {:?} at offset {}", name, offset);
                index.put(name, offset);
                stats.live_records += 1;
            }

            // read_head bounds the record by the cursor, so this stays in u32
            offset += len as u32;
        }

        Ok(())
    })?;

    Ok((index, stats))
}
