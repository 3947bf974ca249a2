//! # Memtable
//!
//! An in-memory, sorted, mutable write buffer for the storage engine.
//!
//! The memtable is the first point of contact for every write operation. It buffers
//! recent `put` and `delete` operations in a sorted structure (`BTreeMap`) before
//! they are flushed to an immutable on-disk segment.
//!
//! ## Key properties
//! - **Sorted order**: entries are always in ascending key order (required for segment flush).
//! - **Tombstone support**: deletes are recorded as [`ValueEntry::Tombstone`] markers, a
//!   dedicated variant rather than a sentinel value, so there is no value a caller could
//!   write that would collide with "deleted".
//! - **Approximate size tracking**: tracks the byte size of keys + values for flush threshold decisions.
//!
//! ## Example
//! ```rust
//! use memtable::{Memtable, Value};
//!
//! let mut m = Memtable::new();
//! m.put("hello".to_string(), Value::Str("world".to_string()));
//! assert_eq!(m.get("hello"), Some(&Value::Str("world".to_string())));
//!
//! m.delete("hello".to_string());
//! assert_eq!(m.get("hello"), None);
//! ```

use std::collections::BTreeMap;

/// A typed scalar value. The on-disk type tag byte is the externalized
/// discriminant of this enum — there is no separate runtime type check
/// anywhere in the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f64),
    Str(String),
}

impl Value {
    /// Byte width of this value's payload as it appears on disk, excluding the
    /// type tag itself. Used by the memtable's size estimator and by the segment
    /// writer's block-size bookkeeping.
    pub fn encoded_len(&self) -> usize {
        match self {
            Value::Int(_) => 4,
            Value::Float(_) => 8,
            Value::Str(s) => 4 + s.len(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v}"),
        }
    }
}

/// A single entry in the memtable: either a live value or a tombstone.
///
/// Tombstones are retained in the memtable (and, unless the flush path skips
/// them, written out to segments) so that older values in older segments are
/// correctly shadowed during reads.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueEntry {
    Present(Value),
    Tombstone,
}

impl ValueEntry {
    pub fn is_tombstone(&self) -> bool {
        matches!(self, ValueEntry::Tombstone)
    }

    /// Byte width of the entry's payload: zero for a tombstone.
    fn payload_len(&self) -> usize {
        match self {
            ValueEntry::Present(v) => v.encoded_len(),
            ValueEntry::Tombstone => 0,
        }
    }
}

/// Fixed per-entry overhead folded into the size estimate, standing in for the
/// bookkeeping (tag byte, tombstone byte, map node) a precise heap profiler would
/// also count. Not meant to match any particular allocator; only to make the
/// estimate monotonic in content.
const ENTRY_OVERHEAD: usize = 8;

/// An ordered, in-memory write buffer backed by a `BTreeMap`.
///
/// The memtable tracks an approximate byte size (keys + values) so the engine
/// can decide when to flush to a segment. There is no sequence-number gating:
/// within a single memtable a `put`/`delete` always overwrites whatever was
/// there before, which is correct because writes to one memtable are already
/// serialized by the engine's state-transition mutex (see `engine::Engine`).
#[derive(Debug)]
pub struct Memtable {
    map: BTreeMap<String, ValueEntry>,
    approx_size: usize,
}

impl Memtable {
    /// Creates a new, empty memtable.
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
            approx_size: 0,
        }
    }

    fn entry_cost(key: &str, entry: &ValueEntry) -> usize {
        key.len() + entry.payload_len() + ENTRY_OVERHEAD
    }

    /// Inserts a key-value pair, overwriting any prior entry for the key
    /// (including a tombstone).
    pub fn put(&mut self, key: String, value: Value) {
        let entry = ValueEntry::Present(value);
        self.replace(key, entry);
    }

    /// Records a tombstone (delete marker) for the given key, overwriting
    /// any prior entry.
    pub fn delete(&mut self, key: String) {
        self.replace(key, ValueEntry::Tombstone);
    }

    fn replace(&mut self, key: String, entry: ValueEntry) {
        if let Some(old) = self.map.get(&key) {
            let old_cost = Self::entry_cost(&key, old);
            self.approx_size = self.approx_size.saturating_sub(old_cost);
        }
        self.approx_size = self
            .approx_size
            .saturating_add(Self::entry_cost(&key, &entry));
        self.map.insert(key, entry);
    }

    /// Returns a borrowed reference to the value for the given key if it exists
    /// and is **not** a tombstone.
    ///
    /// Prefer [`get_entry`](Memtable::get_entry) when the caller needs to
    /// distinguish "key not found" from "key was deleted" (tombstone).
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self.map.get(key) {
            Some(ValueEntry::Present(v)) => Some(v),
            _ => None,
        }
    }

    /// Returns the raw [`ValueEntry`] for the given key, if present, without
    /// filtering out tombstones.
    pub fn get_entry(&self, key: &str) -> Option<&ValueEntry> {
        self.map.get(key)
    }

    /// Returns `true` if the memtable contains the given key (including tombstones).
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Returns an iterator over all entries in **ascending key order**,
    /// including tombstones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueEntry)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of entries (including tombstones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns the approximate byte size of all keys and values stored. Used
    /// by the engine to decide when to flush.
    #[must_use]
    pub fn approx_size(&self) -> usize {
        self.approx_size
    }

    /// Returns `true` if the memtable contains zero entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Removes all entries and resets `approx_size` to zero. Used when
    /// installing a fresh memtable after a flush rotation.
    pub fn clear(&mut self) {
        self.map.clear();
        self.approx_size = 0;
    }
}

impl Default for Memtable {
    fn default() -> Self {
        Self::new()
    }
}
