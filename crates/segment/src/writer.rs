//! Segment writer.
//!
//! Serializes an ordered `(key, ValueEntry)` stream into one segment file,
//! producing a sparse block index (first key of each block → byte offset) as
//! a side effect of the single write pass.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use memtable::ValueEntry;

use crate::format;

/// First-key-per-block → byte-offset map. Held in memory for the lifetime of
/// the owning `Segment`.
pub type SparseIndex = BTreeMap<String, u64>;

/// Writes `entries` (already in ascending key order) to `path`, returning the
/// sparse index built during the write.
///
/// When `skip_tombstones` is set, tombstoned entries are dropped from the
/// output entirely — this is the behavior used when flushing a memtable,
/// which means a tombstone that never outlives its memtable never reaches
/// disk at all. Compaction passes `skip_tombstones = false` because by the
/// time it calls this function it has already resolved tombstones itself.
pub fn write_segment(
    path: &Path,
    entries: impl Iterator<Item = (String, ValueEntry)>,
    block_size_bytes: usize,
    skip_tombstones: bool,
) -> io::Result<SparseIndex> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let mut offsets = SparseIndex::new();
    let mut current_block_size: usize = 0;
    let mut is_first_block = true;
    let mut file_position: u64 = 0;

    for (key, entry) in entries {
        if skip_tombstones && entry.is_tombstone() {
            continue;
        }

        let encoded = format::encode_record(&key, &entry);
        let s = encoded.len();

        if is_first_block {
            offsets.insert(key.clone(), 0);
            is_first_block = false;
            current_block_size = s;
        } else if current_block_size + s > block_size_bytes {
            writer.flush()?;
            offsets.insert(key.clone(), file_position);
            current_block_size = s;
        } else {
            current_block_size += s;
        }

        writer.write_all(&encoded)?;
        file_position += s as u64;
    }

    writer.flush()?;
    Ok(offsets)
}
