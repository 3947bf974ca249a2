//! On-disk record codec.
//!
//! ```text
//! key_len : u32
//! key     : key_len bytes (UTF-8)
//! tomb    : u8  (0x00 or 0x01)
//! type    : u8  ('i' = int32, 'd' = float64, 's' = string)
//! if type == 'i': value : i32
//! if type == 'd': value : f64
//! if type == 's': val_len : u32, value : val_len bytes (UTF-8)
//! ```
//!
//! All integers are big-endian, with no padding between fields.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use memtable::{Value, ValueEntry};
use std::io::{self, Read};

use crate::error::SegmentError;

const TYPE_INT: u8 = b'i';
const TYPE_FLOAT: u8 = b'd';
const TYPE_STR: u8 = b's';

/// Encodes one record into its wire representation. Returns the full byte
/// buffer so the caller can both write it and learn its serialized size `s`
/// (`buf.len()`) for block-size bookkeeping in one step.
pub fn encode_record(key: &str, entry: &ValueEntry) -> Vec<u8> {
    let mut buf = Vec::with_capacity(key.len() + 16);
    buf.write_u32::<BigEndian>(key.len() as u32).unwrap();
    buf.extend_from_slice(key.as_bytes());

    match entry {
        ValueEntry::Tombstone => {
            buf.write_u8(1).unwrap();
            // A tombstone still carries a type tag so the record has a fixed
            // shape on decode; the tag itself is never consulted for a
            // tombstoned record (the tomb flag short-circuits first).
            buf.write_u8(TYPE_STR).unwrap();
            buf.write_u32::<BigEndian>(0).unwrap();
        }
        ValueEntry::Present(Value::Int(v)) => {
            buf.write_u8(0).unwrap();
            buf.write_u8(TYPE_INT).unwrap();
            buf.write_i32::<BigEndian>(*v).unwrap();
        }
        ValueEntry::Present(Value::Float(v)) => {
            buf.write_u8(0).unwrap();
            buf.write_u8(TYPE_FLOAT).unwrap();
            buf.write_f64::<BigEndian>(*v).unwrap();
        }
        ValueEntry::Present(Value::Str(s)) => {
            buf.write_u8(0).unwrap();
            buf.write_u8(TYPE_STR).unwrap();
            buf.write_u32::<BigEndian>(s.len() as u32).unwrap();
            buf.extend_from_slice(s.as_bytes());
        }
    }

    buf
}

/// Byte offset of the tombstone flag within an encoded record, relative to
/// the record's start — `key_len` field (4 bytes) plus the key itself. The
/// engine uses this to flip a tombstone in place without rewriting the
/// record, used to flip a tombstone in place when a delete finds the key
/// only in an older segment.
pub fn tombstone_flag_offset(key_byte_len: usize) -> u64 {
    4 + key_byte_len as u64
}

/// Reads exactly one field's worth of bytes, distinguishing a clean
/// end-of-file (zero bytes available) from a truncated read (some bytes
/// available, then EOF) — the latter is `corrupt`, the former is the
/// ordinary "no more records" signal at end of segment.
fn read_exact_or_eof<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<bool, SegmentError> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => {
                return if filled == 0 {
                    Ok(false)
                } else {
                    Err(SegmentError::Corrupt)
                };
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(SegmentError::Io(e)),
        }
    }
    Ok(true)
}

/// Decodes one record from `r`. Returns `Ok(None)` at a clean end-of-segment,
/// `Ok(Some((key, entry, bytes_consumed)))` on success, and `Err(Corrupt)` on
/// a truncated record or an unrecognized type tag.
pub fn read_record<R: Read>(r: &mut R) -> Result<Option<(String, ValueEntry, usize)>, SegmentError> {
    let mut len_buf = [0u8; 4];
    if !read_exact_or_eof(r, &mut len_buf)? {
        return Ok(None);
    }
    let key_len = u32::from_be_bytes(len_buf) as usize;
    let mut consumed = 4;

    let mut key_buf = vec![0u8; key_len];
    r.read_exact(&mut key_buf)?;
    consumed += key_len;
    let key = String::from_utf8(key_buf).map_err(|_| SegmentError::Corrupt)?;

    let tomb = r.read_u8()?;
    let type_tag = r.read_u8()?;
    consumed += 2;

    let entry = if tomb != 0 {
        // A tombstoned record still has a value payload on disk (written by
        // encode_record above); skip past it without interpreting it.
        match type_tag {
            TYPE_INT => {
                r.read_i32::<BigEndian>()?;
                consumed += 4;
            }
            TYPE_FLOAT => {
                r.read_f64::<BigEndian>()?;
                consumed += 8;
            }
            TYPE_STR => {
                let val_len = r.read_u32::<BigEndian>()? as usize;
                consumed += 4;
                let mut discard = vec![0u8; val_len];
                r.read_exact(&mut discard)?;
                consumed += val_len;
            }
            _ => return Err(SegmentError::Corrupt),
        }
        ValueEntry::Tombstone
    } else {
        match type_tag {
            TYPE_INT => {
                let v = r.read_i32::<BigEndian>()?;
                consumed += 4;
                ValueEntry::Present(Value::Int(v))
            }
            TYPE_FLOAT => {
                let v = r.read_f64::<BigEndian>()?;
                consumed += 8;
                ValueEntry::Present(Value::Float(v))
            }
            TYPE_STR => {
                let val_len = r.read_u32::<BigEndian>()? as usize;
                consumed += 4;
                let mut val_buf = vec![0u8; val_len];
                r.read_exact(&mut val_buf)?;
                consumed += val_len;
                let s = String::from_utf8(val_buf).map_err(|_| SegmentError::Corrupt)?;
                ValueEntry::Present(Value::Str(s))
            }
            _ => return Err(SegmentError::Corrupt),
        }
    };

    Ok(Some((key, entry, consumed)))
}
