//! driftlog-storage: a segmented, offset-addressed, append-only commit log
//! persisted on a local filesystem.
//!
//! Producers append opaque byte records and receive a monotonically
//! increasing 64-bit offset; consumers read a record by offset or stream
//! the raw bytes of every segment. Durability, offset assignment, segment
//! rollover, and index/data coherence live here; serialization schemas and
//! network front-ends are external collaborators that talk to the
//! [`CommitLog`] trait.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Log            rollover, routing, truncation │
//! │  ├── Segment   <base>.store + <base>.index   │
//! │  │    ├── Store   length-prefixed frames     │
//! │  │    └── Index   mmap offset → position     │
//! │  ├── Segment   (sealed)                      │
//! │  └── Segment   (active, appends go here)     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use driftlog_storage::{Config, Log, Record};
//!
//! # fn main() -> driftlog_storage::Result<()> {
//! let log = Log::open("/var/lib/driftlog", Config::default())?;
//!
//! let offset = log.append(Record::new("hello world"))?;
//! let record = log.read(offset)?;
//! assert_eq!(record.offset, offset);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod log;
pub mod reader;
pub mod segment;
pub mod store;

pub use config::{Config, SegmentConfig};
pub use driftlog_core::{codec, Record};
pub use error::{Error, Result};
pub use log::Log;
pub use reader::Reader;
pub use segment::Segment;
pub use store::Store;

/// Capability trait for producing to and consuming from a commit log.
///
/// Front-ends hold their log dependency through this trait rather than the
/// concrete [`Log`], so tests and alternative backends can stand in for it.
pub trait CommitLog: Send + Sync {
    /// Appends a record and returns its assigned offset.
    fn append(&self, record: Record) -> Result<u64>;

    /// Reads the record at `offset`.
    fn read(&self, offset: u64) -> Result<Record>;
}

impl CommitLog for Log {
    fn append(&self, record: Record) -> Result<u64> {
        Log::append(self, record)
    }

    fn read(&self, offset: u64) -> Result<Record> {
        Log::read(self, offset)
    }
}
