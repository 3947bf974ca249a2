use thiserror::Error;

/// The engine's error taxonomy.
///
/// `UnsupportedType` is retained for protocol completeness even though it is
/// unreachable from this crate's own internals: `memtable::Value` is a closed
/// three-variant enum, so there is no runtime value that is "neither int32,
/// float64, nor string" — the compiler rules it out. See `DESIGN.md`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("value type not supported")]
    UnsupportedType,

    #[error("key '{0}' not found")]
    NotFound(String),

    #[error("corrupt segment data")]
    Corrupt,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<segment::SegmentError> for EngineError {
    fn from(e: segment::SegmentError) -> Self {
        match e {
            segment::SegmentError::Corrupt => EngineError::Corrupt,
            segment::SegmentError::Io(io) => EngineError::Io(io),
        }
    }
}
