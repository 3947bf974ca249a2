//! The command adapter: the `get`/`put`/`delete` dispatch table and the exact
//! reply text of the wire protocol.
//!
//! Translates UTF-8 command lines into `Engine` calls and maps the outcome
//! back to the exact reply text the protocol promises. This module has no
//! knowledge of sockets; `server::handle_connection` is the only caller.

use std::sync::Arc;

use engine::{Engine, EngineError, Value};

/// Parses `line` and tries to infer a type for `put`'s value the way a typed
/// wire value would be read off: int32 first, then float64, then a plain
/// UTF-8 string. Multi-word values are joined back together with single
/// spaces, which the original single-token `put` never needed to do.
fn parse_value(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i32>() {
        return Value::Int(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Str(raw.to_string())
}

/// Handles a single command line against `engine`, returning the exact reply
/// text. Never panics on malformed input; an unparsable command line maps to
/// the same reply as an unrecognized command.
pub fn dispatch(engine: &Arc<Engine>, line: &str) -> String {
    let mut parts = line.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("");

    match cmd {
        "get" => {
            let key = rest.trim();
            if key.is_empty() {
                return unrecognized();
            }
            match engine.get(key) {
                Ok(Some(v)) => v.to_string(),
                Ok(None) => format!("key '{key}' not found"),
                Err(e) => format!("error: {e}"),
            }
        }
        "put" => {
            let mut kv = rest.splitn(2, ' ');
            let key = kv.next().unwrap_or("").trim();
            let value = kv.next().unwrap_or("").trim();
            if key.is_empty() || value.is_empty() {
                return unrecognized();
            }
            match engine.put(key.to_string(), parse_value(value)) {
                Ok(()) => "OK".to_string(),
                Err(e) => format!("error: {e}"),
            }
        }
        "delete" => {
            let key = rest.trim();
            if key.is_empty() {
                return unrecognized();
            }
            // Delete of an absent key still replies OK, matching the source
            // adapter — downstream consumers cannot tell it apart from a
            // real delete.
            match engine.delete(key) {
                Ok(()) | Err(EngineError::NotFound(_)) => "OK".to_string(),
                Err(e) => format!("error: {e}"),
            }
        }
        _ => unrecognized(),
    }
}

fn unrecognized() -> String {
    "Unrecognized command. Type \"exit\" to exit".to_string()
}
