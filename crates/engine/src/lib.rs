//! # Engine
//!
//! The central orchestrator tying [`memtable`], [`segment`], and [`config`]
//! into a complete LSM-tree key-value store.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   |
//!   v
//! ┌───────────────────────────────────────────────┐
//! │                   ENGINE                      │
//! │                                               │
//! │ write.rs → Memtable insert                    │
//! │              |                                │
//! │              |  (approx_size over budget?)    │
//! │              v                                │
//! │           flush() → new segment               │
//! │                                               │
//! │ compaction.rs → background timer → merge all  │
//! │                                    segments    │
//! │                                               │
//! │ read.rs → live memtable → flushing memtable   │
//! │            → segments, newest to oldest        │
//! │            (first match wins, tombstone stops) │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Module responsibilities
//!
//! | Module        | Purpose                                           |
//! |--------------|----------------------------------------------------|
//! | [`lib.rs`]   | `Engine` struct, `open`, `shutdown`, `Drop`         |
//! | [`state`]    | The two-slot memtable state machine                 |
//! | [`write`]    | `put`, `delete`, `force_flush`, internal `flush`    |
//! | [`read`]     | `get`                                               |
//! | [`compaction`] | `compact_once` plus the background timer thread   |
//! | [`error`]    | `EngineError`                                       |
//!
//! ## Durability
//!
//! There is no write-ahead log. A write is visible to readers as soon as it
//! lands in the memtable, but it is not crash-durable until its segment has
//! been flushed to disk — this engine does not aim for crash durability at
//! all.

mod compaction;
mod error;
mod read;
mod state;
mod write;

use std::path::Path;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use compaction::Compactor;
pub use config::EngineConfig;
pub use error::EngineError;
pub use memtable::Value;
use segment::Segment;
use state::MemState;

/// The central storage engine orchestrating the memtable and on-disk
/// segments.
///
/// # Write path
///
/// 1. Apply the mutation to the live memtable.
/// 2. If its resident size crosses `memtable_max_bytes`, flush it to a new
///    segment.
///
/// # Read path
///
/// 1. Check the live memtable, then the memtable currently being flushed.
/// 2. Check segments newest to oldest.
/// 3. First match wins; a tombstone at any tier shadows everything older.
///
/// # Compaction
///
/// A background thread periodically merges all segments into one, dropping
/// tombstones and superseded values.
pub struct Engine {
    pub(crate) config: EngineConfig,
    pub(crate) state: Mutex<MemState>,
    /// Newest-first. Readers take a clone of the `Arc` list under the lock
    /// and then release it immediately, so a long scan never blocks a flush
    /// or a compaction from publishing.
    pub(crate) segments: RwLock<Vec<Arc<Segment>>>,
    pub(crate) next_segment_id: AtomicU64,
    compactor: Mutex<Option<Compactor>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("Engine")
            .field("storage_dir", &self.config.storage_dir)
            .field("memtable_entries", &state.live.len())
            .field("memtable_size", &state.live.approx_size())
            .field("flushing", &state.flushing.is_some())
            .field("segment_count", &self.segments.read().unwrap().len())
            .finish()
    }
}

impl Engine {
    /// Opens an engine rooted at `config.storage_dir`, creating the
    /// directory if needed, and starts the background compactor.
    ///
    /// There is no recovery step: the engine always starts with an empty
    /// memtable and no segments, even if `storage_dir` holds files from a
    /// previous run — no manifest or WAL is kept, so there is nothing to
    /// recover from safely.
    pub fn open(config: EngineConfig) -> Result<Arc<Self>, EngineError> {
        std::fs::create_dir_all(&config.storage_dir)?;

        let interval = Duration::from_secs_f64(config.merge_interval_secs.max(0.0));

        let engine = Arc::new(Self {
            config,
            state: Mutex::new(MemState::new()),
            segments: RwLock::new(Vec::new()),
            next_segment_id: AtomicU64::new(0),
            compactor: Mutex::new(None),
        });

        let weak = Arc::downgrade(&engine);
        let compactor = Compactor::start(weak, interval);
        *engine.compactor.lock().unwrap() = Some(compactor);

        Ok(engine)
    }

    /// Stops the background compactor and flushes any remaining data.
    ///
    /// Safe to call more than once; a second call finds the compactor
    /// already taken and the memtable already empty, so both steps are
    /// no-ops.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        if let Some(mut compactor) = self.compactor.lock().unwrap().take() {
            compactor.shutdown();
        }
        self.force_flush()
    }

    /// Returns the directory this engine stores segments in.
    #[must_use]
    pub fn storage_dir(&self) -> &Path {
        &self.config.storage_dir
    }

    /// Returns the number of on-disk segments currently published.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.read().unwrap().len()
    }
}

/// Best-effort flush on drop. Errors are logged, not propagated — `Drop`
/// cannot return a `Result`, and there is no durability guarantee for this
/// engine to uphold beyond "try not to lose the memtable on a clean exit".
impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(mut compactor) = self.compactor.lock().unwrap().take() {
            compactor.shutdown();
        }
        if let Err(e) = self.force_flush() {
            log::warn!("flush on drop failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests;
