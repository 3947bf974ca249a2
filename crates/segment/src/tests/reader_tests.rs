use crate::{write_segment, Lookup, Segment};
use memtable::{Memtable, Value};
use tempfile::tempdir;

fn build_segment(path: &std::path::Path, block_size: usize, entries: &[(&str, Value)]) -> Segment {
    let mut m = Memtable::new();
    for (k, v) in entries {
        m.put(k.to_string(), v.clone());
    }
    let owned: Vec<_> = m.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    let index = write_segment(path, owned.into_iter(), block_size, true).unwrap();
    Segment::new(0, path.to_path_buf(), index)
}

#[test]
fn find_block_range_bounds_interior_key() {
    // index = {"a":0, "c":3, "d":5} — built directly rather than via a real
    // write so the offsets are exact and easy to reason about.
    let mut index = std::collections::BTreeMap::new();
    index.insert("a".to_string(), 0);
    index.insert("c".to_string(), 3);
    index.insert("d".to_string(), 5);
    let seg = Segment::new(0, "unused".into(), index);

    let (lower, upper) = seg.find_block_range("b");
    assert_eq!(lower.map(|s| s.as_str()), Some("a"));
    assert_eq!(upper.map(|s| s.as_str()), Some("c"));

    let (lower, upper) = seg.find_block_range("z");
    assert_eq!(lower.map(|s| s.as_str()), Some("d"));
    assert_eq!(upper, None);
}

#[test]
fn find_returns_value_for_mixed_type_segment() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seg_mixed");
    let seg = build_segment(
        &path,
        4096,
        &[
            ("a", Value::Str("1".to_string())),
            ("b", Value::Int(2)),
            ("c", Value::Float(3.2)),
        ],
    );

    assert_eq!(seg.find("a").unwrap(), Lookup::Found(Value::Str("1".to_string()), 0));
    assert!(matches!(seg.find("b").unwrap(), Lookup::Found(Value::Int(2), _)));
    assert!(matches!(seg.find("c").unwrap(), Lookup::Found(Value::Float(f), _) if f == 3.2));
    assert_eq!(seg.find("z").unwrap(), Lookup::Absent);
}

#[test]
fn find_scans_across_block_boundary() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seg_blocks");
    // Force every key into its own block so "find" has to binary-search and
    // scan, rather than hit the index exactly.
    let seg = build_segment(
        &path,
        1,
        &[
            ("apple", Value::Int(1)),
            ("banana", Value::Int(2)),
            ("cherry", Value::Int(3)),
        ],
    );

    assert!(matches!(seg.find("banana").unwrap(), Lookup::Found(Value::Int(2), _)));
    assert_eq!(seg.find("avocado").unwrap(), Lookup::Absent);
    assert_eq!(seg.find("zucchini").unwrap(), Lookup::Absent);
}

#[test]
fn tombstone_at_hides_key_from_find() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seg_tomb");

    let mut m = Memtable::new();
    m.put("a".to_string(), Value::Str("1".to_string()));
    let owned: Vec<_> = m.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    let index = write_segment(&path, owned.into_iter(), 4096, true).unwrap();
    let seg = Segment::new(0, path.clone(), index);

    let offset = match seg.find("a").unwrap() {
        Lookup::Found(_, offset) => offset,
        other => panic!("expected Found, got {other:?}"),
    };
    seg.tombstone_at(offset, "a".len()).unwrap();

    assert_eq!(seg.find("a").unwrap(), Lookup::Tombstoned);
}

#[test]
fn scan_all_includes_tombstones() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seg_scan");

    let mut m = Memtable::new();
    m.put("a".to_string(), Value::Int(1));
    m.delete("b".to_string());
    let owned: Vec<_> = m.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    let index = write_segment(&path, owned.into_iter(), 4096, false).unwrap();
    let seg = Segment::new(0, path, index);

    let all = seg.scan_all().unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[1].1.is_tombstone());
}

#[test]
fn segment_file_is_removed_only_after_last_reference_dropped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seg_gc");
    std::fs::write(&path, b"placeholder").unwrap();

    let seg = std::sync::Arc::new(Segment::new(0, path.clone(), Default::default()));
    let held = seg.clone();
    seg.mark_for_deletion();
    drop(seg);
    assert!(path.exists(), "file must survive while a reference is held");

    drop(held);
    assert!(!path.exists(), "file must be removed once the last reference drops");
}
