//! Memory-mapped offset index.
//!
//! The index is a dense array of fixed-width entries mapping a
//! segment-relative offset to the byte position of that record's frame in
//! the store file:
//!
//! ```text
//! ┌─────────────────────┬────────────────────┐
//! │ relative offset     │ store position     │   12 bytes per entry,
//! │ (4 bytes BE)        │ (8 bytes BE)       │   packed from byte 0
//! └─────────────────────┴────────────────────┘
//! ```
//!
//! The file is preallocated to `max_index_bytes` on open so the mapping
//! never has to grow, and truncated back to the written prefix on close.
//! On open the pre-truncation size is captured first; that is how a reopen
//! recovers how many entries the previous run wrote.
//!
//! Entry `n` always holds relative offset `n`: the log assigns offsets
//! densely, so the slot number and the relative offset coincide.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::MmapMut;

use crate::{Error, Result};

/// Width of the relative-offset field in bytes.
pub(crate) const OFF_WIDTH: u64 = 4;
/// Width of the store-position field in bytes.
pub(crate) const POS_WIDTH: u64 = 8;
/// Total width of one index entry.
pub const ENT_WIDTH: u64 = OFF_WIDTH + POS_WIDTH;

/// Fixed-width mmap index over a segment's store positions.
///
/// Not internally synchronized; an index is exclusively owned by its
/// segment, which is exclusively owned by the log.
#[derive(Debug)]
pub struct Index {
    file: File,
    path: PathBuf,
    mmap: MmapMut,
    size: u64,
}

impl Index {
    /// Opens (creating if missing) the index file at `path`, preallocating
    /// it to `max_index_bytes` and mapping it read-write.
    pub fn open(path: impl Into<PathBuf>, max_index_bytes: u64) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        // The stat size is the prefix written by the previous run; capture
        // it before growing the file to its mapped capacity.
        let size = file.metadata()?.len();
        file.set_len(max_index_bytes)?;

        // SAFETY: the file is exclusively owned by this index for the
        // lifetime of the mapping and is not resized until the mapping is
        // dropped in `close`.
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self {
            file,
            path,
            mmap,
            size,
        })
    }

    /// Appends an entry, failing with [`Error::Eof`] once the preallocated
    /// space is exhausted.
    pub fn write(&mut self, rel_offset: u32, position: u64) -> Result<()> {
        if (self.mmap.len() as u64) < self.size + ENT_WIDTH {
            return Err(Error::Eof);
        }

        let at = self.size as usize;
        self.mmap[at..at + OFF_WIDTH as usize].copy_from_slice(&rel_offset.to_be_bytes());
        self.mmap[at + OFF_WIDTH as usize..at + ENT_WIDTH as usize]
            .copy_from_slice(&position.to_be_bytes());

        self.size += ENT_WIDTH;
        Ok(())
    }

    /// Reads entry `n`, failing with [`Error::Eof`] when `n` lies past the
    /// written prefix.
    pub fn read(&self, n: u64) -> Result<(u32, u64)> {
        if self.size == 0 {
            return Err(Error::Eof);
        }
        let at = n.checked_mul(ENT_WIDTH).ok_or(Error::Eof)?;
        if at + ENT_WIDTH > self.size {
            return Err(Error::Eof);
        }

        let at = at as usize;
        let rel_offset =
            u32::from_be_bytes(self.mmap[at..at + OFF_WIDTH as usize].try_into().unwrap());
        let position = u64::from_be_bytes(
            self.mmap[at + OFF_WIDTH as usize..at + ENT_WIDTH as usize]
                .try_into()
                .unwrap(),
        );
        Ok((rel_offset, position))
    }

    /// Last written entry, or [`Error::Eof`] for an empty index. Segment
    /// construction uses this to recover its next offset.
    pub fn last_entry(&self) -> Result<(u32, u64)> {
        if self.size == 0 {
            return Err(Error::Eof);
        }
        self.read(self.size / ENT_WIDTH - 1)
    }

    /// Bytes of the file occupied by written entries.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Syncs the mapping and the file, then truncates the preallocated tail
    /// so only the written prefix survives on disk. Reopening afterwards
    /// reconstructs an identical index.
    pub fn close(self) -> Result<()> {
        let Self {
            file,
            path: _,
            mmap,
            size,
        } = self;

        mmap.flush()?;
        file.sync_all()?;

        // The mapping must be gone before the file shrinks underneath it.
        drop(mmap);
        file.set_len(size)?;
        Ok(())
    }
}
