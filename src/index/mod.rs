//! Index Module
//!
//! In-memory bookkeeping for the log.
//!
//! ## Responsibilities
//! - Map each live name to the offset of its record
//! - Track capacity and the next-free-offset cursor
//! - Answer "is there room for N bytes" before anything is written
//!
//! ## Data Structure Choice
//! Using a plain HashMap for the Index:
//! - Listing order is irrelevant, lookups are by exact name
//! - Compaction sorts by offset on demand
//! - No internal locking: both structures live inside the engine's
//!   RwLock-guarded state and are only touched through it

mod allocator;
mod table;

pub use allocator::SpaceAllocator;
pub use table::Index;
