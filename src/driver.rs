//! Driver
//!
//! Convenience layer over the engine for embedding applications.
//!
//! ## Responsibilities
//! - Create entries from byte slices, local files, or arbitrary readers
//! - Check available space before handing work to the engine
//! - Log every failure before returning it

use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::engine::{CompactionStats, Engine};
use crate::error::{FlatError, Result};
use crate::record::{total_length, RECORD_OVERHEAD};

/// Client-side facade for a shared engine
#[derive(Clone)]
pub struct Driver {
    engine: Arc<Engine>,
}

impl Driver {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// Create an entry with no content
    pub fn create_empty(&self, name: &str) -> Result<()> {
        self.create(name, &[])
    }

    /// Create an entry, failing early if it cannot fit
    pub fn create(&self, name: &str, content: &[u8]) -> Result<()> {
        self.check_space(total_length(name, content))?;
        logged("create", name, self.engine.append(name, content))
    }

    /// Copy a file from the local filesystem, stored under its file name
    ///
    /// Returns the name the entry was created with.
    pub fn copy_existing_file(&self, path: &Path) -> Result<String> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                FlatError::Config(format!("{} has no usable file name", path.display()))
            })?
            .to_string();

        let content = logged("read", &name, fs::read(path).map_err(FlatError::from))?;
        self.create(&name, &content)?;
        Ok(name)
    }

    /// Store everything `source` yields under `name`
    ///
    /// `declared_len` is what the source reported; `None` or zero means
    /// unknown, in which case only the name is checked against the free
    /// space and the engine stops the stream if the content overflows.
    pub fn import_stream<R: Read>(
        &self,
        name: &str,
        declared_len: Option<u64>,
        source: R,
    ) -> Result<u64> {
        let declared_len = declared_len.filter(|&len| len > 0);
        let needed = declared_len.unwrap_or(name.len() as u64);
        self.check_space(needed + RECORD_OVERHEAD as u64)?;

        tracing::info!(
            "Started importing {:?} ({} bytes declared)",
            name,
            declared_len.map_or_else(|| "unknown".to_string(), |n| n.to_string())
        );
        logged(
            "import",
            name,
            self.engine.append_from_stream(name, declared_len, source),
        )
    }

    /// Replace an entry's content, or create it
    pub fn overwrite(&self, name: &str, content: &[u8]) -> Result<()> {
        self.check_space(total_length(name, content))?;
        logged("overwrite", name, self.engine.overwrite(name, content))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.engine.exists(name)
    }

    pub fn list(&self) -> Vec<String> {
        self.engine.list()
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        logged("delete", name, self.engine.delete(name))
    }

    /// Read an entry's content as stored
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        logged("read", name, self.engine.read(name))
    }

    /// Remove all entries, keeping the capacity
    pub fn format(&self) -> Result<()> {
        logged("format", "*", self.engine.format())
    }

    pub fn compact(&self) -> Result<CompactionStats> {
        logged("compact", "*", self.engine.compact())
    }

    pub fn available_space(&self) -> u32 {
        self.engine.available_space()
    }

    fn check_space(&self, needed: u64) -> Result<()> {
        let available = self.engine.available_space();
        if (available as u64) < needed {
            tracing::error!(
                "Available space of {} kB is less than required {} kB",
                available / 1024,
                needed / 1024
            );
            return Err(FlatError::InsufficientSpace {
                requested: needed,
                available,
            });
        }
        Ok(())
    }
}

fn logged<T>(op: &str, name: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        tracing::error!("{} {:?} failed: {}", op, name, e);
    }
    result
}
