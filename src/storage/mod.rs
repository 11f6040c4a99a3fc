//! Storage Module
//!
//! Byte-level access to the single backing file.
//!
//! ## Responsibilities
//! - Create or reopen the backing file
//! - Positioned reads and writes
//! - Header persistence
//! - Truncation and fsync
//!
//! The storage layer knows nothing about the Index or the cursor; record
//! layout lives in `crate::record` and all ordering of structural changes
//! is done by the engine's guard.

mod file;

pub use file::BackingFile;
