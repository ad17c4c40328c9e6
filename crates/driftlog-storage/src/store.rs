//! Length-prefixed append-only record store.
//!
//! The store is a flat file of frames, concatenated without delimiters:
//!
//! ```text
//! ┌───────────────────┬─────────────┬───────────────────┬─────────────┬──
//! │ length (8B BE)    │ payload     │ length (8B BE)    │ payload     │ ...
//! └───────────────────┴─────────────┴───────────────────┴─────────────┴──
//! ```
//!
//! Writes are buffered for throughput; reads are positional and flush the
//! buffer first, so a reader always observes prior appends from this
//! process.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bytes::{BufMut, Bytes, BytesMut};

use crate::Result;

/// Number of bytes used for a frame's length prefix.
pub const LEN_WIDTH: u64 = 8;

/// Buffered append-only data file holding length-prefixed record frames.
///
/// A single mutex serializes append, read, and close.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    writer: BufWriter<File>,
    size: u64,
}

impl Store {
    /// Opens (creating if missing) the store file at `path`. The current
    /// file size becomes the position of the next appended frame.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path,
            inner: Mutex::new(Inner {
                writer: BufWriter::new(file),
                size,
            }),
        })
    }

    /// Appends `payload` as a single length-prefixed frame.
    ///
    /// Returns the frame width in bytes (`LEN_WIDTH + payload.len()`) and
    /// the byte position at which the frame starts. The prefix and payload
    /// are assembled into one buffer and written with a single call, so a
    /// failed append leaves the store size unchanged and never strands a
    /// bare length prefix.
    pub fn append(&self, payload: &[u8]) -> Result<(u64, u64)> {
        let mut inner = self.inner.lock().unwrap();
        let position = inner.size;

        let mut frame = BytesMut::with_capacity(LEN_WIDTH as usize + payload.len());
        frame.put_u64(payload.len() as u64);
        frame.put_slice(payload);
        inner.writer.write_all(&frame)?;

        let written = frame.len() as u64;
        inner.size += written;
        Ok((written, position))
    }

    /// Reads the frame payload whose frame starts at `position`.
    ///
    /// Fails if the file is truncated mid-frame or the read itself fails.
    pub fn read(&self, position: u64) -> Result<Bytes> {
        let mut inner = self.inner.lock().unwrap();
        inner.writer.flush()?;

        let file = inner.writer.get_ref();
        let mut len_buf = [0u8; LEN_WIDTH as usize];
        file.read_exact_at(&mut len_buf, position)?;

        let len = u64::from_be_bytes(len_buf);
        let mut payload = vec![0u8; len as usize];
        file.read_exact_at(&mut payload, position + LEN_WIDTH)?;
        Ok(payload.into())
    }

    /// Raw positional read into `buf`, flushing buffered writes first.
    ///
    /// Returns the number of bytes read; zero means end of file. Used by
    /// the multi-segment byte reader.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        inner.writer.flush()?;
        Ok(inner.writer.get_ref().read_at(buf, offset)?)
    }

    /// Current logical size of the store file in bytes.
    pub fn size(&self) -> u64 {
        self.inner.lock().unwrap().size
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes buffered writes to the file. The descriptor itself is
    /// released when the last handle to this store drops.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRITE: &[u8] = b"hello world";
    const WIDTH: u64 = LEN_WIDTH + WRITE.len() as u64;

    #[test]
    fn append_read_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("append_read.store");
        let store = Store::open(&path).unwrap();

        for i in 1..4u64 {
            let (written, position) = store.append(WRITE).unwrap();
            assert_eq!(position + written, WIDTH * i);
        }

        let mut position = 0;
        for _ in 1..4 {
            let read = store.read(position).unwrap();
            assert_eq!(read, Bytes::from_static(WRITE));
            position += WIDTH;
        }

        // A fresh handle over the same file sees every frame.
        store.close().unwrap();
        drop(store);
        let store = Store::open(&path).unwrap();
        assert_eq!(store.size(), WIDTH * 3);
        assert_eq!(store.read(WIDTH).unwrap(), Bytes::from_static(WRITE));
    }

    #[test]
    fn read_at_walks_raw_frames() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("read_at.store")).unwrap();
        for _ in 0..3 {
            store.append(WRITE).unwrap();
        }

        let mut offset = 0u64;
        for _ in 0..3 {
            let mut len_buf = [0u8; LEN_WIDTH as usize];
            let n = store.read_at(&mut len_buf, offset).unwrap();
            assert_eq!(n, LEN_WIDTH as usize);
            offset += n as u64;

            let len = u64::from_be_bytes(len_buf);
            let mut payload = vec![0u8; len as usize];
            let n = store.read_at(&mut payload, offset).unwrap();
            assert_eq!(payload, WRITE);
            offset += n as u64;
        }

        // Past the last frame there is nothing left.
        let mut buf = [0u8; 1];
        assert_eq!(store.read_at(&mut buf, offset).unwrap(), 0);
    }

    #[test]
    fn close_flushes_buffered_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("close.store");
        let store = Store::open(&path).unwrap();
        store.append(WRITE).unwrap();

        // The frame may still sit in the write buffer.
        let before = std::fs::metadata(&path).unwrap().len();
        store.close().unwrap();
        let after = std::fs::metadata(&path).unwrap().len();

        assert!(after > before);
        assert_eq!(after, WIDTH);
    }

    #[test]
    fn read_of_truncated_frame_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("trunc.store")).unwrap();
        assert!(store.read(0).is_err());
    }
}
