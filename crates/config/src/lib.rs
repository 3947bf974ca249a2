//! # Config
//!
//! Engine configuration. A small, dependency-free leaf crate, matching the
//! rest of the workspace's convention of keeping pure data types out of the
//! crates that do I/O.

use std::path::PathBuf;

/// Default flush threshold: 64 MiB.
pub const DEFAULT_MEMTABLE_MAX_BYTES: usize = 64 * 1024 * 1024;

/// Default target block size for segment writes: 4 KiB.
pub const DEFAULT_BLOCK_SIZE_BYTES: usize = 4 * 1024;

/// Default period between background compaction attempts, in seconds.
pub const DEFAULT_MERGE_INTERVAL_SECS: f64 = 3600.0;

/// Default directory holding segment files.
pub const DEFAULT_STORAGE_DIR: &str = "storage/";

/// The engine's four configuration knobs.
///
/// Only `storage_dir` is exposed on the `server` CLI subcommand; the others
/// are set programmatically (tests override `memtable_max_bytes` and
/// `merge_interval_secs` to force flushes/compactions on short timescales).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub memtable_max_bytes: usize,
    pub block_size_bytes: usize,
    pub merge_interval_secs: f64,
    pub storage_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            memtable_max_bytes: DEFAULT_MEMTABLE_MAX_BYTES,
            block_size_bytes: DEFAULT_BLOCK_SIZE_BYTES,
            merge_interval_secs: DEFAULT_MERGE_INTERVAL_SECS,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
        }
    }
}

impl EngineConfig {
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }
}
