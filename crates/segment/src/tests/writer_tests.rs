use crate::write_segment;
use memtable::{Memtable, Value};
use tempfile::tempdir;

fn entries(m: &Memtable) -> Vec<(String, memtable::ValueEntry)> {
    m.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[test]
fn small_memtable_produces_single_block() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seg_0");

    let mut m = Memtable::new();
    m.put("a".to_string(), Value::Str("apple".to_string()));
    m.put("b".to_string(), Value::Str("banana".to_string()));

    let index = write_segment(&path, entries(&m).into_iter(), 4096, true).unwrap();

    // One block: only the first key gets an index entry.
    assert_eq!(index.len(), 1);
    assert_eq!(index.get("a"), Some(&0));
    assert!(path.exists());
}

#[test]
fn large_entries_split_into_multiple_blocks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seg_1");

    let mut m = Memtable::new();
    // Each value is bigger than the block size, so every record starts a new block.
    m.put("a".to_string(), Value::Str("x".repeat(100)));
    m.put("b".to_string(), Value::Str("y".repeat(100)));
    m.put("c".to_string(), Value::Str("z".repeat(100)));

    let index = write_segment(&path, entries(&m).into_iter(), 32, true).unwrap();

    assert_eq!(index.len(), 3);
    assert_eq!(index.get("a"), Some(&0));
    assert!(index.get("b").unwrap() > &0);
    assert!(index.get("c").unwrap() > index.get("b").unwrap());
}

#[test]
fn flush_skips_tombstones_when_requested() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seg_2");

    let mut m = Memtable::new();
    m.put("a".to_string(), Value::Str("alive".to_string()));
    m.delete("b".to_string());

    let index = write_segment(&path, entries(&m).into_iter(), 4096, true).unwrap();
    assert!(index.contains_key("a"));
    assert!(!index.contains_key("b"));
}

#[test]
fn compaction_pass_keeps_tombstones_when_not_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seg_3");

    let mut m = Memtable::new();
    m.put("a".to_string(), Value::Str("alive".to_string()));
    m.delete("b".to_string());

    let index = write_segment(&path, entries(&m).into_iter(), 4096, false).unwrap();
    assert!(index.contains_key("a"));
    assert!(index.contains_key("b"));
}
