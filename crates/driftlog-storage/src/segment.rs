//! A segment couples one store and one index under a base offset.
//!
//! Each segment owns the file pair `<base_offset>.store` and
//! `<base_offset>.index` and covers the contiguous offset range
//! `[base_offset, next_offset)`. Only the log's active segment is ever
//! appended to; sealed segments serve reads until truncation removes them.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use driftlog_core::{codec, Record};

use crate::config::SegmentConfig;
use crate::index::Index;
use crate::store::Store;
use crate::{Error, Result};

#[derive(Debug)]
pub struct Segment {
    store: Arc<Store>,
    index: Index,
    base_offset: u64,
    next_offset: u64,
    config: SegmentConfig,
}

impl Segment {
    /// Opens (creating if missing) the segment's file pair in `dir`.
    ///
    /// `next_offset` is recovered from the index tail: the index, not the
    /// store, is authoritative for how many records the segment holds. An
    /// empty index means an empty segment, so the next offset is the base
    /// offset itself.
    pub fn open(dir: &Path, base_offset: u64, config: SegmentConfig) -> Result<Self> {
        let store = Arc::new(Store::open(dir.join(format!("{base_offset}.store")))?);
        let index = Index::open(
            dir.join(format!("{base_offset}.index")),
            config.max_index_bytes,
        )?;

        let next_offset = match index.last_entry() {
            Ok((rel_offset, _)) => base_offset + u64::from(rel_offset) + 1,
            Err(Error::Eof) => base_offset,
            Err(e) => return Err(e),
        };

        Ok(Self {
            store,
            index,
            base_offset,
            next_offset,
            config,
        })
    }

    /// Appends `record`, stamping it with this segment's next offset.
    ///
    /// Returns the assigned offset. On any failure the next offset does not
    /// advance, so a subsequent append reuses the same offset.
    pub fn append(&mut self, mut record: Record) -> Result<u64> {
        let offset = self.next_offset;
        record.offset = offset;

        let payload = codec::encode(&record);
        let (_, position) = self.store.append(&payload)?;
        self.index
            .write((offset - self.base_offset) as u32, position)?;

        self.next_offset += 1;
        Ok(offset)
    }

    /// Reads the record stored at absolute `offset`.
    pub fn read(&self, offset: u64) -> Result<Record> {
        if offset < self.base_offset || offset >= self.next_offset {
            return Err(Error::OffsetOutOfRange(offset));
        }

        let (_, position) = self.index.read(offset - self.base_offset)?;
        let payload = self.store.read(position)?;
        Ok(codec::decode(&payload)?)
    }

    /// Whether either size cap has been reached. A maxed segment accepts no
    /// further appends through the log; the log rolls over instead.
    pub fn is_maxed(&self) -> bool {
        self.store.size() >= self.config.max_store_bytes
            || self.index.size() >= self.config.max_index_bytes
    }

    /// Smallest offset this segment covers; also names its files.
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// One past the highest offset this segment holds; equals the base
    /// offset while the segment is empty.
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    pub(crate) fn store_handle(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }

    /// Closes index then store.
    pub fn close(self) -> Result<()> {
        self.index.close()?;
        self.store.close()
    }

    /// Closes the segment and deletes both of its files.
    pub fn remove(self) -> Result<()> {
        let index_path = self.index.path().to_path_buf();
        let store_path = self.store.path().to_path_buf();
        self.close()?;
        fs::remove_file(index_path)?;
        fs::remove_file(store_path)?;
        Ok(())
    }
}
