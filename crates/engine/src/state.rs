use memtable::Memtable;

/// The two-slot memtable state machine: `{only-live} → {live, flushing} →
/// {only-live'}`. All transitions happen under `Engine::state`'s
/// mutex; `flushing` is populated for the duration of a flush so that
/// concurrent readers still see writes that landed in the old memtable after
/// it stopped accepting new ones but before its segment was published.
pub(crate) struct MemState {
    pub(crate) live: Memtable,
    pub(crate) flushing: Option<Memtable>,
}

impl MemState {
    pub(crate) fn new() -> Self {
        Self {
            live: Memtable::new(),
            flushing: None,
        }
    }
}
