//! Random-access byte sources
//!
//! Every parser in this crate reads through [`ByteSource`], a small seekable
//! stream abstraction with two implementations:
//!
//! - [`FileSource`]: backed by a tokio file, every read and seek is a
//!   suspension point
//! - [`MemorySource`]: backed by an in-memory buffer, never suspends; used for
//!   bytes that were already pulled out of a file (verified segments, nested
//!   formats)
//!
//! Fixed-width little-endian integers and SHA-1 digests are read through the
//! [`ReadPrimitives`] extension trait, which is implemented for every source.

mod file;
mod memory;
mod primitive;

pub use file::FileSource;
pub use memory::MemorySource;
pub use primitive::ReadPrimitives;

use async_trait::async_trait;
use thiserror::Error;

/// Result type for byte source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors raised by byte sources
#[derive(Debug, Error)]
pub enum SourceError {
    /// Fewer bytes were available than requested
    #[error("truncated read at offset {position}: requested {requested} bytes, got {received}")]
    TruncatedRead {
        /// Absolute position the read started at
        position: u64,
        /// Number of bytes requested
        requested: usize,
        /// Number of bytes actually available
        received: usize,
    },

    /// A relative seek would move before the start of the source
    #[error("invalid seek from {position} by {delta}")]
    InvalidSeek {
        /// Position before the seek
        position: u64,
        /// Requested displacement
        delta: i64,
    },

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Random-access readable byte stream
///
/// Reads are all-or-nothing: `read(n)` returns exactly `n` bytes or fails with
/// [`SourceError::TruncatedRead`], leaving the position where the read began.
/// Seeking past the end is allowed; the next read reports the truncation.
#[async_trait]
pub trait ByteSource: Send {
    /// Read exactly `len` bytes from the current position
    async fn read(&mut self, len: usize) -> SourceResult<Vec<u8>>;

    /// Move to an absolute position
    async fn seek(&mut self, position: u64) -> SourceResult<()>;

    /// Move relative to the current position
    async fn seek_relative(&mut self, delta: i64) -> SourceResult<()> {
        let target = self
            .position()
            .checked_add_signed(delta)
            .ok_or(SourceError::InvalidSeek {
                position: self.position(),
                delta,
            })?;
        self.seek(target).await
    }

    /// Skip `len` bytes without returning them
    async fn skip(&mut self, len: u64) -> SourceResult<()> {
        let target = self.position().saturating_add(len);
        self.seek(target).await
    }

    /// Current absolute position
    fn position(&self) -> u64;
}

#[async_trait]
impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    async fn read(&mut self, len: usize) -> SourceResult<Vec<u8>> {
        (**self).read(len).await
    }

    async fn seek(&mut self, position: u64) -> SourceResult<()> {
        (**self).seek(position).await
    }

    fn position(&self) -> u64 {
        (**self).position()
    }
}

#[async_trait]
impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    async fn read(&mut self, len: usize) -> SourceResult<Vec<u8>> {
        (**self).read(len).await
    }

    async fn seek(&mut self, position: u64) -> SourceResult<()> {
        (**self).seek(position).await
    }

    fn position(&self) -> u64 {
        (**self).position()
    }
}
