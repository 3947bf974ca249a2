use thiserror::Error;

/// Errors raised while decoding or reading a segment file.
///
/// Mirrors the `corrupt`/`io` kinds of the error taxonomy; `unsupported_type`
/// and `not_found` are engine-level concerns and live in `engine::EngineError`.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// A record failed to decode: an unknown type tag, or a read that hit
    /// end-of-file partway through a field instead of at a record boundary.
    #[error("corrupt segment record")]
    Corrupt,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
