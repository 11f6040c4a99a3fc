//! Engine Module
//!
//! The core storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Open or create the backing file and restore the Index from it
//! - Append, stream, read, delete and overwrite entries
//! - Reclaim dead space through compaction
//! - Serialize structural mutations against concurrent reads
//!
//! ## Submodules
//! - `recovery`: log scan on open
//! - `write`: append / streamed append / delete / overwrite
//! - `read`: read / exists / list / available space
//! - `compaction`: stop-the-world log rewrite

mod compaction;
mod read;
mod recovery;
mod write;

use std::path::Path;

use parking_lot::RwLock;

use crate::config::{Config, SyncStrategy};
use crate::error::Result;
use crate::index::{Index, SpaceAllocator};
use crate::protocol::{encode_name_list, Command};
use crate::record::{Header, HEADER_SIZE};
use crate::storage::BackingFile;

pub use compaction::CompactionStats;
pub use recovery::RecoveryStats;

/// The main storage engine
///
/// ## Concurrency Model: one RwLock per open store
///
/// - **Shared** (read/exists/list/available_space): many concurrent readers
/// - **Exclusive** (append/append_from_stream/delete/overwrite/compact/format):
///   one writer at a time, no readers
///
/// Compaction and format go through the same lock as every other writer;
/// there is no second locking mechanism. The lock belongs to this instance
/// only, so two engines on two different files never contend.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Everything that changes: file, Index, cursor, pending flag
    state: RwLock<StoreState>,
}

/// Mutable engine state, only reachable through the guard
pub(crate) struct StoreState {
    /// The backing file
    pub(crate) file: BackingFile,

    /// Live name → record offset
    pub(crate) index: Index,

    /// Capacity and cursor
    pub(crate) allocator: SpaceAllocator,

    /// Set when at least one tombstone sits below the cursor
    pub(crate) compaction_pending: bool,

    /// Mutations since the last fsync
    pub(crate) unsynced_writes: usize,
}

impl Engine {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Validate config
    /// 2. Create the file with a fresh header, or read the existing header
    /// 3. Scan the log to rebuild the Index (existing stores only)
    /// 4. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Reject unusable settings before touching the disk
        config.validate()?;

        // Step 2: Open the backing file
        let (file, is_new) = BackingFile::open(&config.store_path)?;

        let state = if is_new {
            let header = Header::new(config.capacity);
            file.write_header(&header)?;
            file.sync()?;

            tracing::info!(
                "Created store {} with capacity {} bytes",
                config.store_path.display(),
                header.capacity
            );

            StoreState {
                file,
                index: Index::new(),
                allocator: SpaceAllocator::new(header.capacity),
                compaction_pending: false,
                unsynced_writes: 0,
            }
        } else {
            // The persisted capacity governs; the configured one is informational
            let header = file.read_header()?;
            if header.capacity != config.capacity {
                tracing::warn!(
                    "Store {} has capacity {} bytes, ignoring configured {}",
                    config.store_path.display(),
                    header.capacity,
                    config.capacity
                );
            }

            // Step 3: Rebuild the Index from the log
            let (index, stats) = recovery::restore(&file, &header)?;

            tracing::info!(
                "Restored store {}: {} live records, {} tombstoned ({} bytes), cursor={}",
                config.store_path.display(),
                stats.live_records,
                stats.dead_records,
                stats.dead_bytes,
                header.cursor
            );

            StoreState {
                file,
                index,
                allocator: SpaceAllocator::from_header(header),
                compaction_pending: stats.dead_records > 0,
                unsynced_writes: 0,
            }
        };

        Ok(Self {
            config,
            state: RwLock::new(state),
        })
    }

    /// Open with a path and capacity (convenience method)
    ///
    /// Uses default config for everything else.
    pub fn open_path(path: &Path, capacity: u32) -> Result<Self> {
        let config = Config::builder()
            .store_path(path)
            .capacity(capacity)
            .build();
        Self::open(config)
    }

    /// Execute a command
    ///
    /// Routes wire commands to the matching operation. Payloads:
    /// - READ: content bytes as stored
    /// - EXISTS: one byte, 1 or 0
    /// - LIST: encoded name list
    /// - SPACE / COMPACT: big-endian available bytes / reclaimed bytes
    pub fn execute(&self, command: Command) -> Result<Option<Vec<u8>>> {
        match command {
            Command::Read { name } => self.read(&name).map(Some),
            Command::Create { name, content } => {
                self.append(&name, &content)?;
                Ok(None)
            }
            Command::Overwrite { name, content } => {
                self.overwrite(&name, &content)?;
                Ok(None)
            }
            Command::Delete { name } => {
                self.delete(&name)?;
                Ok(None)
            }
            Command::Exists { name } => Ok(Some(vec![self.exists(&name) as u8])),
            Command::List => Ok(Some(encode_name_list(&self.list()))),
            Command::Space => Ok(Some(self.available_space().to_be_bytes().to_vec())),
            Command::Compact => {
                let stats = self.compact()?;
                Ok(Some(stats.bytes_reclaimed.to_be_bytes().to_vec()))
            }
            Command::Format => {
                self.format()?;
                Ok(None)
            }
            Command::Ping => Ok(Some(b"PONG".to_vec())),
        }
    }

    /// Drop every entry
    ///
    /// Resets the cursor to the end of the header and clears the Index.
    /// Capacity is untouched and the file is kept (truncated to its header).
    pub fn format(&self) -> Result<()> {
        let mut state = self.state.write();

        let header = Header::new(state.allocator.capacity());
        state.file.write_header(&header)?;
        state.file.set_len(HEADER_SIZE as u64)?;
        state.file.sync()?;

        let dropped = state.index.len();
        state.index.clear();
        state.allocator.reset();
        state.compaction_pending = false;
        state.unsynced_writes = 0;

        tracing::info!("Formatted store, dropped {} entries", dropped);
        Ok(())
    }

    /// Force an fsync of the backing file
    pub fn sync(&self) -> Result<()> {
        let mut state = self.state.write();
        state.file.sync()?;
        state.unsynced_writes = 0;
        Ok(())
    }

    /// Close the engine gracefully
    ///
    /// Syncs any outstanding writes to disk
    pub fn close(self) -> Result<()> {
        self.sync()
    }

    /// Count a structural mutation and fsync when the strategy says so
    ///
    /// Called with the write guard held.
    fn record_mutation(&self, state: &mut StoreState) -> Result<()> {
        state.unsynced_writes += 1;

        let due = match self.config.sync_strategy {
            SyncStrategy::EveryWrite => true,
            SyncStrategy::EveryNWrites { count } => state.unsynced_writes >= count,
        };

        if due {
            state.file.sync()?;
            state.unsynced_writes = 0;
        }
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.config.store_path
    }

    /// Total store size from the header (not necessarily the configured one)
    pub fn capacity(&self) -> u32 {
        self.state.read().allocator.capacity()
    }

    /// Offset of the next free byte
    pub fn cursor(&self) -> u32 {
        self.state.read().allocator.cursor()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.state.read().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().index.is_empty()
    }

    /// Whether tombstoned records are waiting for compaction
    pub fn compaction_pending(&self) -> bool {
        self.state.read().compaction_pending
    }
}
