//! Write path: `put`, `delete`, `force_flush`, and the internal `flush`.
//!
//! `put`/`delete` apply directly to the live memtable; when its resident size
//! crosses `memtable_max_bytes` they trigger a flush. There is no
//! write-ahead log — a write is durable only once its segment has been
//! fsynced... and in this implementation, not even then; durability against
//! crash is explicitly out of scope.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use memtable::Value;

use crate::error::EngineError;
use crate::Engine;

impl Engine {
    /// Inserts a key-value pair. Overwrites any prior entry, including a
    /// tombstone.
    pub fn put(&self, key: String, value: Value) -> Result<(), EngineError> {
        let should_flush = {
            let mut state = self.state.lock().unwrap();
            state.live.put(key, value);
            state.live.approx_size() >= self.config.memtable_max_bytes
        };
        if should_flush {
            self.flush()?;
        }
        Ok(())
    }

    /// Deletes `key`.
    ///
    /// If `key` is live in the current memtable, it is replaced with a
    /// tombstone there. Otherwise the newest segment holding a
    /// non-tombstoned record for `key` has its tombstone byte flipped in
    /// place. If no segment holds the key either, fails with `NotFound` —
    /// note that the memtable *currently being flushed* is not consulted
    /// here, matching the source adapter's behavior.
    pub fn delete(&self, key: &str) -> Result<(), EngineError> {
        let should_flush = {
            let mut state = self.state.lock().unwrap();
            if state.live.contains_key(key) {
                state.live.delete(key.to_string());
                Some(state.live.approx_size() >= self.config.memtable_max_bytes)
            } else {
                None
            }
        };

        if let Some(should_flush) = should_flush {
            if should_flush {
                self.flush()?;
            }
            return Ok(());
        }

        let segments = self.segments.read().unwrap().clone();
        for seg in segments.iter() {
            if let segment::Lookup::Found(_, offset) = seg.find(key)? {
                seg.tombstone_at(offset, key.len())?;
                return Ok(());
            }
        }

        Err(EngineError::NotFound(key.to_string()))
    }

    /// Forces a flush of the current memtable to a new segment. A no-op if
    /// the memtable is empty.
    pub fn force_flush(&self) -> Result<(), EngineError> {
        let is_empty = self.state.lock().unwrap().live.is_empty();
        if is_empty {
            return Ok(());
        }
        self.flush()
    }

    /// Rotates the live memtable into the `flushing` slot, writes it to a new
    /// segment, publishes the segment, then clears the `flushing` slot.
    ///
    /// The segment is pushed into the segment list *before* the `flushing`
    /// slot is cleared, so a concurrent reader taking either snapshot first
    /// always finds the key in at least one place.
    pub(crate) fn flush(&self) -> Result<(), EngineError> {
        let snapshot: Vec<(String, memtable::ValueEntry)> = {
            let mut state = self.state.lock().unwrap();
            let old_live = std::mem::take(&mut state.live);
            let snapshot = old_live
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
            state.flushing = Some(old_live);
            snapshot
        };

        let id = self.next_segment_id.fetch_add(1, Ordering::SeqCst);
        let path = self.config.storage_dir.join(format!("segment_{id}"));
        log::info!("flushing memtable to {path:?}");

        let index = segment::write_segment(
            &path,
            snapshot.into_iter(),
            self.config.block_size_bytes,
            true,
        )?;
        let new_segment = Arc::new(segment::Segment::new(id, path, index));

        {
            let mut segments = self.segments.write().unwrap();
            segments.insert(0, new_segment);
        }

        {
            let mut state = self.state.lock().unwrap();
            state.flushing = None;
        }

        log::info!("flush complete, published segment {id}");
        Ok(())
    }
}
