//! Read path: `get`.
//!
//! Point lookups check the live memtable, then the memtable currently being
//! flushed (if any), then segments newest to oldest. A tombstone at any tier
//! shadows everything older and ends the search immediately.

use memtable::{Value, ValueEntry};

use crate::error::EngineError;
use crate::Engine;

impl Engine {
    /// Looks up `key`, returning its value if live.
    pub fn get(&self, key: &str) -> Result<Option<Value>, EngineError> {
        {
            let state = self.state.lock().unwrap();
            if let Some(entry) = state.live.get_entry(key) {
                return Ok(present_or_absent(entry));
            }
            if let Some(flushing) = &state.flushing {
                if let Some(entry) = flushing.get_entry(key) {
                    return Ok(present_or_absent(entry));
                }
            }
        }

        let segments = self.segments.read().unwrap().clone();
        for seg in segments.iter() {
            match seg.find(key)? {
                segment::Lookup::Found(v, _) => return Ok(Some(v)),
                segment::Lookup::Tombstoned => return Ok(None),
                segment::Lookup::Absent => continue,
            }
        }

        Ok(None)
    }
}

fn present_or_absent(entry: &ValueEntry) -> Option<Value> {
    match entry {
        ValueEntry::Present(v) => Some(v.clone()),
        ValueEntry::Tombstone => None,
    }
}
