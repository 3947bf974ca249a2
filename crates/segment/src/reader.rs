//! Segment reader: index-assisted lookups over an immutable segment file.
//!
//! A `Segment` pairs an immutable on-disk file with its in-memory sparse
//! index. Lookups use the index to bound the scan to a single block; the
//! index itself is never rebuilt into a flat list per lookup — `BTreeMap`'s
//! `range` already gives binary-search-shaped bounds.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use memtable::{Value, ValueEntry};

use crate::error::SegmentError;
use crate::format;
use crate::writer::SparseIndex;

/// Outcome of a `Segment::find`, keeping "key deleted here" distinct from
/// "key never existed here" — collapsing the two would let an older
/// segment's stale value leak through a newer tombstone.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Value, u64),
    Tombstoned,
    Absent,
}

/// One immutable segment file plus its sparse index.
///
/// Segments are reference-counted (`Arc<Segment>`) by the engine so that a
/// reader holding a snapshot of the segment list keeps the backing file alive
/// for the duration of its scan even if a concurrent compaction removes the
/// segment from the live list. `mark_for_deletion` flips a flag that `Drop`
/// consults to actually unlink the file once the last reference goes away.
#[derive(Debug)]
pub struct Segment {
    id: u64,
    path: PathBuf,
    index: SparseIndex,
    pending_delete: AtomicBool,
}

impl Segment {
    pub fn new(id: u64, path: PathBuf, index: SparseIndex) -> Self {
        Self {
            id,
            path,
            index,
            pending_delete: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> &SparseIndex {
        &self.index
    }

    /// Marks this segment's file for deletion once the last `Arc<Segment>`
    /// referencing it is dropped. Used by compaction after a replacement
    /// segment has been installed.
    pub fn mark_for_deletion(&self) {
        self.pending_delete.store(true, Ordering::Release);
    }

    /// Determines the bounding block range for `key` via the sparse index.
    /// Exposed directly (not just through `find`) so the block-bounding
    /// logic can be tested in isolation.
    pub fn find_block_range(&self, key: &str) -> (Option<&String>, Option<&String>) {
        if self.index.is_empty() {
            return (None, None);
        }

        let lower = self
            .index
            .range(..key.to_string())
            .next_back()
            .map(|(k, _)| k)
            .or_else(|| self.index.keys().next());

        let upper = self
            .index
            .range(key.to_string()..)
            .next()
            .map(|(k, _)| k);

        (lower, upper)
    }

    /// Locates `key` within this segment.
    ///
    /// Distinguishes `Tombstoned` from `Absent` deliberately: the engine's
    /// tiered lookup must stop at the first tombstone it finds scanning
    /// newest-to-oldest rather than falling through to an older segment's
    /// stale live value.
    pub fn find(&self, key: &str) -> Result<Lookup, SegmentError> {
        if let Some(&offset) = self.index.get(key) {
            let mut file = File::open(&self.path)?;
            file.seek(SeekFrom::Start(offset))?;
            if let Some((_, entry, _)) = format::read_record(&mut file)? {
                return Ok(match entry {
                    ValueEntry::Present(v) => Lookup::Found(v, offset),
                    ValueEntry::Tombstone => Lookup::Tombstoned,
                });
            }
            return Ok(Lookup::Absent);
        }

        let (lower, upper) = self.find_block_range(key);
        let lower = match lower {
            Some(k) => k.clone(),
            None => return Ok(Lookup::Absent),
        };
        let upper = upper.cloned();

        let start_offset = self.index[&lower];
        let mut file = BufReader::new(File::open(&self.path)?);
        file.seek(SeekFrom::Start(start_offset))?;

        let mut offset = start_offset;
        loop {
            match format::read_record(&mut file)? {
                None => return Ok(Lookup::Absent),
                Some((k, entry, consumed)) => {
                    let record_start = offset;
                    offset += consumed as u64;

                    if k == key {
                        return Ok(match entry {
                            ValueEntry::Present(v) => Lookup::Found(v, record_start),
                            ValueEntry::Tombstone => Lookup::Tombstoned,
                        });
                    }
                    if let Some(ref up) = upper {
                        if &k > up {
                            return Ok(Lookup::Absent);
                        }
                    }
                }
            }
        }
    }

    /// Flips the tombstone flag of the record at `record_offset` in place,
    /// without touching the rest of the record. Used by `engine::Engine::delete`
    /// when the key is found only in an older segment.
    pub fn tombstone_at(&self, record_offset: u64, key_byte_len: usize) -> Result<(), SegmentError> {
        let mut file = OpenOptions::new().write(true).open(&self.path)?;
        file.seek(SeekFrom::Start(
            record_offset + format::tombstone_flag_offset(key_byte_len),
        ))?;
        file.write_all(&[1u8])?;
        Ok(())
    }

    /// Reads every record in the segment, in file order (ascending key
    /// order, per the writer's invariant). Used by the compactor, which must
    /// see tombstones as well as live entries.
    pub fn scan_all(&self) -> Result<Vec<(String, ValueEntry)>, SegmentError> {
        let mut file = BufReader::new(File::open(&self.path)?);
        let mut out = Vec::new();
        while let Some((key, entry, _)) = format::read_record(&mut file)? {
            out.push((key, entry));
        }
        Ok(out)
    }
}

impl Drop for Segment {
    fn drop(&mut self) {
        if self.pending_delete.load(Ordering::Acquire) {
            if let Err(e) = std::fs::remove_file(&self.path) {
                log::warn!("failed to remove compacted segment {:?}: {e}", self.path);
            }
        }
    }
}
