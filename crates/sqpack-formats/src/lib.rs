//! Parsers for SqPack index containers and data entries
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Signed hash view
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Format terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
#![allow(clippy::future_not_send)] // Generic sources
//! SqPack archives store game assets in an index container plus one or more
//! companion data files. No plaintext file names are stored; every asset is
//! addressed by a pair of CRC-based hashes of its directory and file name.
//!
//! # Modules
//!
//! - **source**: Seekable byte sources over files and in-memory buffers
//! - **hash**: Path hashing and SHA-1 digests
//! - **index**: Index container parsing with per-segment integrity checks
//! - **lookup**: The two-level hash table built from an index
//! - **entry**: Data entry decoding (binary, texture, model, placeholder)
//!
//! # Example
//!
//! ```rust,no_run
//! use sqpack_formats::entry::decode_entry;
//! use sqpack_formats::hash::path_hash;
//! use sqpack_formats::index::parse_index;
//! use sqpack_formats::source::FileSource;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut index_file = FileSource::open("060000.win32.index").await?;
//! let index = parse_index(&mut index_file).await?;
//!
//! let location = index
//!     .lookup
//!     .get(path_hash("ui/icon/000000"), path_hash("000001.tex"))
//!     .ok_or("not found")?;
//!
//! let mut data_file = FileSource::open("060000.win32.dat0").await?;
//! let entry = decode_entry(&mut data_file, location.offset).await?;
//! println!("{:?}: {:?} bytes", entry.kind(), entry.into_payload().map(|p| p.len()));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod entry;
pub mod hash;
pub mod index;
pub mod lookup;
pub mod source;

pub use entry::{ContentType, DecodedEntry, EntryContent, EntryError, decode_entry};
pub use hash::{Sha1Digest, path_hash, path_hash_signed};
pub use index::{IndexError, ParsedIndex, parse_index};
pub use lookup::{LookupStore, StorageLocation};
pub use source::{ByteSource, FileSource, MemorySource, ReadPrimitives, SourceError};
