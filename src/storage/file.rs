//! Backing File
//!
//! Positioned I/O on the store file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use parking_lot::Mutex;

use crate::error::Result;
use crate::record::{Header, HEADER_SIZE};

/// The single file holding header and log
///
/// ## Concurrency:
/// - `file`: Protected by a Mutex because every access seeks first. The
///   engine's RwLock decides *who* may touch the store; this Mutex only keeps
///   a seek and the following read/write together when several shared-guard
///   readers are active at once.
#[derive(Debug)]
pub struct BackingFile {
    /// Open handle (read + write)
    file: Mutex<File>,
}

impl BackingFile {
    /// Open the file at `path`, creating it (and its parent directory) if missing
    ///
    /// Returns the handle and whether the file is new (zero length).
    pub fn open(path: &Path) -> Result<(Self, bool)> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let is_new = file.metadata()?.len() == 0;

        Ok((
            Self {
                file: Mutex::new(file),
            },
            is_new,
        ))
    }

    /// Read and validate the header
    pub fn read_header(&self) -> Result<Header> {
        let mut bytes = [0u8; HEADER_SIZE as usize];
        let read = {
            let mut file = self.file.lock();
            file.seek(SeekFrom::Start(0))?;
            read_up_to(&mut *file, &mut bytes)?
        };
        Header::decode(&bytes[..read])
    }

    /// Overwrite the header at offset 0
    pub fn write_header(&self, header: &Header) -> Result<()> {
        self.write_at(0, &header.encode())
    }

    /// Write `bytes` at absolute `offset`
    pub fn write_at(&self, offset: u64, bytes: &[u8]) -> Result<()> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(bytes)?;
        Ok(())
    }

    /// Run `f` with a buffered reader positioned at `offset`
    ///
    /// The file stays locked for the duration of `f`.
    pub fn with_reader<T>(
        &self,
        offset: u64,
        f: impl FnOnce(&mut BufReader<&mut File>) -> Result<T>,
    ) -> Result<T> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        let mut reader = BufReader::new(&mut *file);
        f(&mut reader)
    }

    /// Truncate (or extend) the file to `len` bytes
    pub fn set_len(&self, len: u64) -> Result<()> {
        self.file.lock().set_len(len)?;
        Ok(())
    }

    /// Current length of the file on disk
    pub fn len(&self) -> Result<u64> {
        Ok(self.file.lock().metadata()?.len())
    }

    /// Flush file contents to the device
    pub fn sync(&self) -> Result<()> {
        self.file.lock().sync_data()?;
        Ok(())
    }
}

/// Fill as much of `buf` as the file allows
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
