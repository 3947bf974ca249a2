
use config::EngineConfig;
use std::sync::Arc;
use tempfile::TempDir;

use crate::Engine;

/// Opens an engine rooted at a fresh temp directory, returning both so the
/// directory lives long enough for the test.
pub(crate) fn open_test_engine(cfg: EngineConfig) -> (Arc<Engine>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let cfg = cfg.with_storage_dir(dir.path());
    let engine = Engine::open(cfg).unwrap();
    (engine, dir)
}
