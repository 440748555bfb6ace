//! SqPack index container parsing
//!
//! An index file starts with a fixed container header, followed by a segment
//! table describing four payload regions, each covered by a SHA-1 digest.
//! Segment 1 holds the file records that map hash pairs to data offsets.
//!
//! ```text
//! 0x000  "SqPack" (u48)  reserved[6]  header_length  reserved  container_type
//! 0x3C0  header SHA-1
//! header_length:
//!        segment_header_length
//!        4 × { index, offset, size, sha1[20], reserved[0x28] (+4 after segment 1) }
//! segment 1 payload:
//!        n × { file_hash, path_hash, raw_offset, reserved }   (16 bytes each)
//! ```
//!
//! Parsing verifies every segment before the lookup table is built, so a
//! corrupted index never produces a partially populated [`LookupStore`].
//!
//! # Example
//!
//! ```rust,no_run
//! use sqpack_formats::index::parse_index;
//! use sqpack_formats::source::FileSource;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut source = FileSource::open("060000.win32.index").await?;
//! let index = parse_index(&mut source).await?;
//! println!("{} files in {} directories", index.lookup.len(), index.lookup.directory_count());
//! # Ok(())
//! # }
//! ```

mod error;
mod header;
mod record;
mod segment;

pub use error::{IndexError, IndexResult};
pub use header::{ContainerHeader, HEADER_HASH_OFFSET, INDEX_CONTAINER_TYPE, SQPACK_MAGIC};
pub use record::{IndexRecord, OFFSET_UNIT, RECORD_SIZE};
pub use segment::{FIRST_SEGMENT_EXTRA, SEGMENT_COUNT, SEGMENT_RESERVED, SegmentDescriptor};

use crate::lookup::{LookupStore, StorageLocation};
use crate::source::{ByteSource, MemorySource, ReadPrimitives};
use binrw::BinRead;
use std::io::Cursor;
use tracing::{debug, info, trace};

/// Result of parsing an index container
#[derive(Debug, Clone)]
pub struct ParsedIndex {
    /// Container header
    pub header: ContainerHeader,
    /// Length field at the start of the segment table
    pub segment_header_length: u32,
    /// The four verified segment descriptors, in table order
    pub segments: Vec<SegmentDescriptor>,
    /// Hash lookup table built from segment 1
    pub lookup: LookupStore,
    /// Records dropped because their hash pair was already present
    pub duplicate_records: usize,
}

/// Parse and verify an index container
///
/// Every segment is checked against its digest, in table order, before any
/// record is read. A mismatch returns [`IndexError::Integrity`], which callers
/// must treat as fatal (see [`IndexError::is_fatal`]).
pub async fn parse_index<S: ByteSource + ?Sized>(source: &mut S) -> IndexResult<ParsedIndex> {
    let header = ContainerHeader::read(source).await?;

    let segment_header_length = source.read_u32_le().await?;
    let mut segments = Vec::with_capacity(usize::from(SEGMENT_COUNT));
    let mut file_records = Vec::new();

    for number in 1..=SEGMENT_COUNT {
        let descriptor = SegmentDescriptor::read(source, number).await?;
        let payload = descriptor.load_verified(source).await?;
        if number == 1 {
            file_records = payload;
        }
        segments.push(descriptor);
    }

    let files = &segments[0];
    let (lookup, duplicate_records) = build_lookup(files, file_records)?;

    info!(
        "Parsed index: {} files in {} directories ({} duplicates dropped)",
        lookup.len(),
        lookup.directory_count(),
        duplicate_records
    );

    Ok(ParsedIndex {
        header,
        segment_header_length,
        segments,
        lookup,
        duplicate_records,
    })
}

/// Scan verified segment 1 bytes into a lookup table
///
/// Returns the table and the number of duplicate records that were dropped.
fn build_lookup(segment: &SegmentDescriptor, payload: Vec<u8>) -> IndexResult<(LookupStore, usize)> {
    if payload.len() % RECORD_SIZE != 0 {
        return Err(IndexError::MalformedSegment {
            segment: segment.number,
            reason: format!(
                "size {} is not a multiple of the {RECORD_SIZE}-byte record size",
                payload.len()
            ),
        });
    }

    let mut records = MemorySource::new(payload);
    let mut lookup = LookupStore::new();
    let mut duplicates = 0;

    while records.remaining() > 0 {
        let raw = records.read_now(RECORD_SIZE)?;
        let record = IndexRecord::read(&mut Cursor::new(raw))?;
        let location = StorageLocation::new(segment.index, record.byte_offset());

        trace!(
            "Record {:08x}/{:08x} -> {:#x}",
            record.path_hash,
            record.file_hash,
            location.offset
        );

        if !lookup.insert_first(record.path_hash, record.file_hash, location) {
            debug!(
                "Duplicate record {:08x}/{:08x} dropped",
                record.path_hash, record.file_hash
            );
            duplicates += 1;
        }
    }

    Ok((lookup, duplicates))
}
