//! Data entry error types

use crate::source::SourceError;
use thiserror::Error;

/// Data entry result type
pub type EntryResult<T> = Result<T, EntryError>;

/// Errors raised while decoding a data entry
#[derive(Debug, Error)]
pub enum EntryError {
    /// Deflate stream could not be inflated
    #[error("decompression failed at offset {offset:#x}: {reason}")]
    Decompression {
        /// Offset of the block header
        offset: u64,
        /// Inflate error message
        reason: String,
    },

    /// Inflated output exceeded the safety limit
    #[error("decompressed block at offset {offset:#x} exceeds limit of {limit} bytes")]
    TooLarge {
        /// Offset of the block header
        offset: u64,
        /// Limit in bytes
        limit: usize,
    },

    /// Entry header or block table is inconsistent
    #[error("invalid entry at offset {offset:#x}: {reason}")]
    InvalidLayout {
        /// Offset of the entry
        offset: u64,
        /// What is wrong
        reason: String,
    },

    /// Underlying read failed (including truncated block streams)
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Fixed record decoding failed
    #[error("binary format error: {0}")]
    BinRead(#[from] binrw::Error),
}
