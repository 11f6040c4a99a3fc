//! # FlatFS
//!
//! An embedded single-file blob store with:
//! - One flat backing file of fixed capacity
//! - Append-only log of named records with in-place tombstones
//! - In-memory name index rebuilt by scanning the log on open
//! - Compaction to reclaim space held by deleted records
//! - Single-writer/multi-reader concurrency model
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              TCP Server / Driver facade                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Engine                                  │
//! │         RwLock<StoreState> (one per backing file)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────┐
//!          │            │             │
//!          ▼            ▼             ▼
//!   ┌────────────┐ ┌──────────┐ ┌────────────┐
//!   │   Index    │ │Allocator │ │   Record   │
//!   │ name→offset│ │ cursor   │ │   codec    │
//!   └────────────┘ └──────────┘ └─────┬──────┘
//!                                     │
//!                                     ▼
//!                              ┌─────────────┐
//!                              │ BackingFile │
//!                              └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod index;
pub mod storage;
pub mod engine;
pub mod driver;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FlatError, Result};
pub use config::{Config, SyncStrategy};
pub use engine::{CompactionStats, Engine, RecoveryStats};
pub use driver::Driver;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of FlatFS
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
