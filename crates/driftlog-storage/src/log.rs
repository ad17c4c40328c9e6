//! The log: one logical offset space over an ordered list of segments.
//!
//! The log owns every segment in its directory, keeps them sorted by base
//! offset with contiguous coverage, appends through the last (active)
//! segment, and rolls over to a fresh segment once the active one reports
//! itself maxed. Reads route the requested offset to the unique covering
//! segment.
//!
//! # Locking
//!
//! One reader-writer lock guards the segment list. `append`, `truncate`,
//! and `reader` take it exclusively; `read`, `lowest_offset`, and
//! `highest_offset` take it shared. The list only changes under the
//! exclusive lock, and the store below has its own mutex, so shared reads
//! are consistent.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use driftlog_core::Record;
use tracing::{debug, info};

use crate::config::Config;
use crate::reader::Reader;
use crate::segment::Segment;
use crate::{Error, Result};

/// An append-only, segmented, offset-addressed commit log persisted under a
/// single directory. Owned by a single process.
#[derive(Debug)]
pub struct Log {
    dir: PathBuf,
    config: Config,
    /// Ordered by base offset; the last segment is the active one. Never
    /// empty.
    segments: RwLock<Vec<Segment>>,
}

impl Log {
    /// Opens the log at `dir`, creating the directory if needed and
    /// rebuilding segments from any existing file pairs. Zero-valued size
    /// caps in `config` are normalized to 1024.
    pub fn open(dir: impl Into<PathBuf>, mut config: Config) -> Result<Self> {
        if config.segment.max_store_bytes == 0 {
            config.segment.max_store_bytes = 1024;
        }
        if config.segment.max_index_bytes == 0 {
            config.segment.max_index_bytes = 1024;
        }

        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let segments = Self::load_segments(&dir, &config)?;
        info!(
            dir = %dir.display(),
            segments = segments.len(),
            "log opened"
        );

        Ok(Self {
            dir,
            config,
            segments: RwLock::new(segments),
        })
    }

    /// Scans `dir` for `<base_offset>.store` / `<base_offset>.index` pairs
    /// and rebuilds one segment per distinct base offset, ascending. Each
    /// base offset normally appears twice (once per extension); collecting
    /// the distinct set keeps directory iteration order irrelevant.
    fn load_segments(dir: &Path, config: &Config) -> Result<Vec<Segment>> {
        let mut base_offsets = BTreeSet::new();
        for entry in fs::read_dir(dir)? {
            let file_name = entry?.file_name();
            let name = file_name.to_string_lossy();
            let stem = name
                .strip_suffix(".store")
                .or_else(|| name.strip_suffix(".index"));
            if let Some(base_offset) = stem.and_then(|s| s.parse::<u64>().ok()) {
                base_offsets.insert(base_offset);
            }
        }

        let mut segments = Vec::with_capacity(base_offsets.len().max(1));
        for base_offset in base_offsets {
            segments.push(Segment::open(dir, base_offset, config.segment.clone())?);
        }
        if segments.is_empty() {
            segments.push(Segment::open(
                dir,
                config.segment.initial_offset,
                config.segment.clone(),
            )?);
        }
        Ok(segments)
    }

    /// Appends `record` to the active segment and returns the assigned
    /// offset. Rolls over to a new segment at `offset + 1` once the active
    /// segment reports itself maxed.
    pub fn append(&self, record: Record) -> Result<u64> {
        let mut segments = self.segments.write().unwrap();
        let active = segments
            .last_mut()
            .expect("log always holds at least one segment");
        let offset = active.append(record)?;

        if active.is_maxed() {
            debug!(base_offset = offset + 1, "active segment maxed, rolling over");
            let segment = Segment::open(&self.dir, offset + 1, self.config.segment.clone())?;
            segments.push(segment);
        }
        Ok(offset)
    }

    /// Reads the record at `offset`, failing with
    /// [`Error::OffsetOutOfRange`] when no segment covers it.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let segments = self.segments.read().unwrap();
        let segment = segments
            .iter()
            .find(|s| s.base_offset() <= offset && offset < s.next_offset())
            .ok_or(Error::OffsetOutOfRange(offset))?;
        segment.read(offset)
    }

    /// Base offset of the oldest segment.
    pub fn lowest_offset(&self) -> u64 {
        let segments = self.segments.read().unwrap();
        segments
            .first()
            .expect("log always holds at least one segment")
            .base_offset()
    }

    /// Highest offset written so far, or 0 for a log with no records.
    pub fn highest_offset(&self) -> u64 {
        let segments = self.segments.read().unwrap();
        let next_offset = segments
            .last()
            .expect("log always holds at least one segment")
            .next_offset();
        next_offset.saturating_sub(1)
    }

    /// Removes every sealed segment whose records all lie at or below
    /// `lowest`. The active segment is never removed, so the log always
    /// covers at least one (possibly empty) offset range.
    ///
    /// Segments leave the in-memory list before their files are deleted; a
    /// deletion error therefore cannot leave a removed segment still
    /// routable.
    pub fn truncate(&self, lowest: u64) -> Result<()> {
        let mut segments = self.segments.write().unwrap();
        let len = segments.len();

        let mut kept = Vec::with_capacity(len);
        let mut doomed = Vec::new();
        for (i, segment) in segments.drain(..).enumerate() {
            let sealed = i + 1 < len;
            if sealed && segment.next_offset() <= lowest.saturating_add(1) {
                doomed.push(segment);
            } else {
                kept.push(segment);
            }
        }
        *segments = kept;
        drop(segments);

        for segment in doomed {
            debug!(
                base_offset = segment.base_offset(),
                "removing truncated segment"
            );
            segment.remove()?;
        }
        Ok(())
    }

    /// Byte reader over the raw store files of every segment, in offset
    /// order. The stream is finite and not restartable; callers parse the
    /// length-prefixed frames themselves.
    pub fn reader(&self) -> Reader {
        let segments = self.segments.write().unwrap();
        Reader::new(segments.iter().map(Segment::store_handle).collect())
    }

    /// Flushes and closes every segment. Consuming the log makes
    /// use-after-close unrepresentable; reopen with [`Log::open`].
    pub fn close(self) -> Result<()> {
        let segments = self.segments.into_inner().unwrap();
        for segment in segments {
            segment.close()?;
        }
        Ok(())
    }

    /// Closes the log and deletes its directory.
    pub fn remove(self) -> Result<()> {
        let dir = self.dir.clone();
        self.close()?;
        fs::remove_dir_all(&dir)?;
        info!(dir = %dir.display(), "log removed");
        Ok(())
    }

    /// Removes the log and reopens an empty one against the same directory
    /// with the same configuration.
    pub fn reset(self) -> Result<Log> {
        let dir = self.dir.clone();
        let config = self.config.clone();
        self.remove()?;
        Log::open(dir, config)
    }

    /// Directory the log stores its segment files in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The configuration the log was opened with, after normalization.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
