//! Read Path
//!
//! Queries that only need the shared guard.

use std::io::Read;

use crate::error::{FlatError, Result};
use crate::record::{read_head, Record};

use super::{Engine, StoreState};

impl Engine {
    /// Read an entry's content
    ///
    /// Content is returned exactly as stored: an entry created with empty
    /// content reads back as the four sentinel bytes `FF FF FF FF`.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let state = self.state.read();

        let offset = state
            .index
            .get(name)
            .ok_or_else(|| FlatError::NotFound(name.to_string()))?;

        let record = state.load_record(offset)?;
        if record.name != name {
            return Err(FlatError::corrupt(format!(
                "index points {:?} at offset {}, which holds {:?}",
                name, offset, record.name
            )));
        }

        Ok(record.content)
    }

    /// Check whether a live entry exists
    pub fn exists(&self, name: &str) -> bool {
        self.state.read().index.contains(name)
    }

    /// Names of all live entries, in no particular order
    pub fn list(&self) -> Vec<String> {
        self.state.read().index.names()
    }

    /// Bytes left between the cursor and the capacity
    pub fn available_space(&self) -> u32 {
        self.state.read().allocator.available()
    }
}

impl StoreState {
    /// Load the live record starting at `offset`
    pub(super) fn load_record(&self, offset: u32) -> Result<Record> {
        let end = self.allocator.cursor();

        self.file.with_reader(offset as u64, |reader| {
            let head = read_head(reader, offset, end)?;
            if head.deleted {
                return Err(FlatError::corrupt(format!(
                    "indexed record at offset {} is tombstoned",
                    offset
                )));
            }

            let mut content = vec![0u8; head.content_len as usize];
            reader.read_exact(&mut content)?;

            Ok(Record {
                deleted: false,
                name: head.name,
                content,
            })
        })
    }
}
