//! Sequential byte reader over all segment store files.

use std::io::{self, Read};
use std::sync::Arc;

use crate::store::Store;
use crate::Error;

/// Reads the raw, length-prefix-framed bytes of every store file in
/// segment order as one finite stream.
///
/// Obtained from [`Log::reader`](crate::Log::reader). Each store is read
/// from byte 0 through a flushed positional read, so buffered appends are
/// visible; once a store runs out the reader moves to the next one. The
/// stream exposes no per-record boundaries; consumers parse the 8-byte
/// big-endian length prefixes themselves.
#[derive(Debug)]
pub struct Reader {
    stores: Vec<Arc<Store>>,
    current: usize,
    position: u64,
}

impl Reader {
    pub(crate) fn new(stores: Vec<Arc<Store>>) -> Self {
        Self {
            stores,
            current: 0,
            position: 0,
        }
    }
}

impl Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while let Some(store) = self.stores.get(self.current) {
            let n = store.read_at(buf, self.position).map_err(|e| match e {
                Error::Io(e) => e,
                other => io::Error::other(other),
            })?;
            if n > 0 {
                self.position += n as u64;
                return Ok(n);
            }
            // This store is exhausted; start the next one from byte 0.
            self.current += 1;
            self.position = 0;
        }
        Ok(0)
    }
}
