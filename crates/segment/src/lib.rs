//! # Segment
//!
//! Immutable, on-disk storage files for the storage engine.
//!
//! When the in-memory [`memtable::Memtable`] exceeds its size threshold the
//! engine flushes it to disk as a segment. Segments are *write-once,
//! read-many* — once created they are never rewritten, except for a single
//! tombstone byte flipped in place by `delete` — until a compaction replaces
//! them outright.
//!
//! ## File layout
//!
//! ```text
//! key_len (u32 BE) | key | tomb (u8) | type (u8) | value
//! ... repeated for each record, in ascending key order ...
//! ```
//!
//! There is no footer and no full per-key index on disk: the index is
//! *sparse* (one entry per block, built while writing) and lives only in
//! memory for the segment's lifetime.

mod error;
mod format;
mod reader;
mod writer;

pub use error::SegmentError;
pub use format::{encode_record, read_record, tombstone_flag_offset};
pub use reader::{Lookup, Segment};
pub use writer::{write_segment, SparseIndex};

#[cfg(test)]
mod tests;
