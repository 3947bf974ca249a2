//! Compaction and the background timer that drives it.
//!
//! There is no first-class cancelable-timer primitive in the standard
//! library, so the periodic task is a dedicated worker thread sleeping on a
//! condition variable: a shutdown wakes it immediately instead of waiting out
//! the rest of the interval, and `merge_interval_secs` can be set to a
//! sub-second value without spinning.

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use memtable::{Value, ValueEntry};

use crate::error::EngineError;
use crate::Engine;

pub(crate) struct Compactor {
    stop: Arc<(Mutex<bool>, Condvar)>,
    handle: Option<JoinHandle<()>>,
}

impl Compactor {
    /// Spawns the background thread. Holds only a `Weak` reference to the
    /// engine so the compactor never keeps the engine alive by itself —
    /// once the last external `Arc<Engine>` drops, the next wake finds
    /// `upgrade()` failing and the thread exits.
    pub(crate) fn start(engine: Weak<Engine>, interval: Duration) -> Self {
        let stop = Arc::new((Mutex::new(false), Condvar::new()));
        let stop_for_thread = Arc::clone(&stop);

        let handle = thread::spawn(move || loop {
            let (lock, cvar) = &*stop_for_thread;
            let guard = lock.lock().unwrap();
            let (guard, _timeout) = cvar.wait_timeout(guard, interval).unwrap();
            if *guard {
                return;
            }
            drop(guard);

            match engine.upgrade() {
                Some(engine) => {
                    if let Err(e) = engine.compact_once() {
                        log::warn!("background compaction failed: {e}");
                    }
                }
                None => return,
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Signals the worker to stop and joins it. This cancels *future* fires;
    /// an in-flight compaction still runs to completion because the join
    /// waits for it.
    pub(crate) fn shutdown(&mut self) {
        {
            let (lock, cvar) = &*self.stop;
            let mut stopped = lock.lock().unwrap();
            *stopped = true;
            cvar.notify_all();
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Engine {
    /// Runs one compaction pass, merging every segment into one. A no-op if
    /// fewer than two segments exist.
    pub fn compact_once(&self) -> Result<(), EngineError> {
        let segments = self.segments.read().unwrap().clone();
        if segments.len() < 2 {
            return Ok(());
        }

        log::info!("compaction starting over {} segments", segments.len());

        // Oldest to newest: segments is newest-first, so iterate in reverse.
        let mut merged: BTreeMap<String, Value> = BTreeMap::new();
        for seg in segments.iter().rev() {
            for (key, entry) in seg.scan_all()? {
                match entry {
                    ValueEntry::Present(v) => {
                        merged.insert(key, v);
                    }
                    ValueEntry::Tombstone => {
                        merged.remove(&key);
                    }
                }
            }
        }

        let id = self.next_segment_id.fetch_add(1, Ordering::SeqCst);
        let path = self.config.storage_dir.join(format!("merged_segment_{id}"));
        let index = segment::write_segment(
            &path,
            merged.into_iter().map(|(k, v)| (k, ValueEntry::Present(v))),
            self.config.block_size_bytes,
            false,
        )?;
        let new_segment = Arc::new(segment::Segment::new(id, path, index));

        {
            let mut segs = self.segments.write().unwrap();
            for old in segs.drain(..) {
                old.mark_for_deletion();
            }
            segs.push(new_segment);
        }

        log::info!("compaction complete, published segment {id}");
        Ok(())
    }
}
