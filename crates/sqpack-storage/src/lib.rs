//! Archive sessions for SqPack index and data files.
//!
//! This crate ties the parsers in `sqpack-formats` to files on disk:
//!
//! - **Archive**: one index file, its `.dat0` companion and the artifacts
//!   produced while working on it (snapshot, confirmed paths, SQL export)
//! - **Resolver**: tests candidate paths against the hash table and shrinks
//!   it as names are discovered
//! - **Candidates**: generators for the enumerable name spaces
//! - **Extraction**: decodes entries for known paths into an output tree
//!
//! # Artifact Layout
//!
//! For an index file `060000.win32.index` and the default work directory:
//!
//! ```text
//! data/060000.win32.index.json   hash table with resolved entries removed
//! data/060000.win32.index.txt    confirmed paths, sorted, one per line
//! data/060000.win32.index.sql    INSERT batches for folders and file names
//! extract/<archive path>         extracted payloads
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use sqpack_storage::{Archive, ArchiveConfig, candidates};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ArchiveConfig::new("sqpack/ffxiv/060000.win32.index");
//! let archive = Archive::open(config)?;
//!
//! let report = archive.brute_force(candidates::loading_images()).await?;
//! println!("{} new paths", report.found.len());
//!
//! let extracted = archive.extract_confirmed().await?;
//! println!("{} files extracted", extracted.extracted.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::must_use_candidate)]

use sqpack_formats::entry::EntryError;
use sqpack_formats::hash::Sha1Digest;
use sqpack_formats::index::IndexError;
use sqpack_formats::source::SourceError;
use std::path::PathBuf;
use thiserror::Error;

// Archive session
pub mod archive;

// Candidate path generators
pub mod candidates;

// Configuration
pub mod config;

// Brute-force resolution
pub mod resolver;

// Confirmed path file
pub mod results;

// Hash table snapshots
pub mod snapshot;

// SQL export
pub mod sql;

pub use archive::{Archive, BruteForceReport, ExtractReport, PathLookup};
pub use config::ArchiveConfig;
pub use resolver::{BruteForceResolver, Resolution, split_full_path};
pub use results::ConfirmedPaths;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during archive operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Bad magic, container type or malformed layout.
    #[error("Invalid format: {0}")]
    Format(String),

    /// Segment checksum mismatch. The archive must not be used further.
    #[error("Integrity check failed for segment {segment}: expected {expected}, got {actual}")]
    Integrity {
        /// Segment number (1-4)
        segment: u8,
        /// Digest stored in the segment table
        expected: Sha1Digest,
        /// Digest of the bytes on disk
        actual: Sha1Digest,
    },

    /// Candidate path has no directory part.
    #[error("\"{0}\" is not a valid path")]
    InvalidPath(String),

    /// Path is not present in the index.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Companion file is missing.
    #[error("Missing resource: {}", .0.display())]
    MissingResource(PathBuf),

    /// Data entry could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be serialized or parsed.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl StorageError {
    /// Whether the process must stop working with this archive
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }
}

impl From<IndexError> for StorageError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Integrity {
                segment,
                expected,
                actual,
            } => Self::Integrity {
                segment,
                expected,
                actual,
            },
            IndexError::Source(SourceError::Io(io)) => Self::Io(io),
            other => Self::Format(other.to_string()),
        }
    }
}

impl From<EntryError> for StorageError {
    fn from(err: EntryError) -> Self {
        match err {
            EntryError::Source(SourceError::Io(io)) => Self::Io(io),
            other => Self::Decode(other.to_string()),
        }
    }
}

impl From<SourceError> for StorageError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Io(io) => Self::Io(io),
            other => Self::Format(other.to_string()),
        }
    }
}

/// Default directory for snapshots, confirmed paths and SQL exports.
pub const DEFAULT_WORK_DIR: &str = "data";

/// Default directory for extracted files.
pub const DEFAULT_EXTRACT_DIR: &str = "extract";

/// Extension of the data file read by the decoder.
pub const DATA_FILE_EXTENSION: &str = "dat0";

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_only_integrity_is_fatal() {
        let digest = Sha1Digest::of(b"x");
        let integrity: StorageError = IndexError::Integrity {
            segment: 2,
            expected: digest,
            actual: digest,
        }
        .into();
        assert!(integrity.is_fatal());

        let format: StorageError = IndexError::NotAnIndex(1).into();
        assert!(matches!(format, StorageError::Format(_)));
        assert!(!format.is_fatal());

        let decode: StorageError = EntryError::InvalidLayout {
            offset: 0,
            reason: "bad".to_string(),
        }
        .into();
        assert!(matches!(decode, StorageError::Decode(_)));
    }

    #[test]
    fn test_io_errors_stay_io() {
        let err: StorageError =
            IndexError::Source(SourceError::Io(std::io::Error::other("disk"))).into();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
