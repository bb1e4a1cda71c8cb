//! Crate-level error type.
//!
//! `EndOfStream` is handled internally by the ranking fetcher and never
//! escapes to a caller — it is kept here only so the underlying read helpers
//! can use `?` uniformly.

#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    #[error("end of stream")]
    EndOfStream,

    #[error("malformed ranking record: {0}")]
    MalformedRecord(String),

    #[error("unsupported graph file version: {0} (expected 0)")]
    UnsupportedVersion(u32),

    #[error("graph file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, AlignError>;
