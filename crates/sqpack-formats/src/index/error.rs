//! Error types for index parsing

use crate::hash::Sha1Digest;
use crate::source::SourceError;
use thiserror::Error;

/// Index parsing result type
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors raised while parsing an index container
#[derive(Debug, Error)]
pub enum IndexError {
    /// Signature does not match the SqPack magic
    #[error("not a container file: signature {0:#014x}")]
    NotAContainer(u64),

    /// Container type is not the index type
    #[error("not an index container: type {0}")]
    NotAnIndex(u32),

    /// Segment bytes do not hash to the stored digest
    #[error("segment {segment} checksum mismatch: expected {expected}, got {actual}")]
    Integrity {
        /// Segment number (1-4)
        segment: u8,
        /// Digest stored in the segment table
        expected: Sha1Digest,
        /// Digest of the bytes on disk
        actual: Sha1Digest,
    },

    /// Segment layout is inconsistent
    #[error("malformed segment {segment}: {reason}")]
    MalformedSegment {
        /// Segment number (1-4)
        segment: u8,
        /// What is wrong with it
        reason: String,
    },

    /// Underlying read failed
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Record decoding failed
    #[error("binary format error: {0}")]
    BinRead(#[from] binrw::Error),
}

impl IndexError {
    /// Whether continuing after this error would mean trusting corrupted data
    ///
    /// Checksum mismatches are the only fatal index errors.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }

    /// Whether this error means the input is not a supported index file
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::NotAContainer(_) | Self::NotAnIndex(_) | Self::MalformedSegment { .. }
        )
    }
}
