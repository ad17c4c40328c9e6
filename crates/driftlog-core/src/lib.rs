//! driftlog-core: the record type and wire codec shared by the driftlog
//! storage engine and its front-ends.
//!
//! A [`Record`] is an opaque byte value plus the 64-bit offset the log
//! assigns at append time. Before a record reaches the on-disk store it is
//! serialized by [`codec`] into a self-checking payload; the storage engine
//! treats that payload as opaque bytes and only decodes it again on read.

pub mod codec;
pub mod error;
pub mod record;

pub use error::{Error, Result};
pub use record::Record;
