//! Block decompression
//!
//! Every compressed block starts with a 16-byte header followed by the stored
//! bytes. A stored length of exactly [`LITERAL_BLOCK_SENTINEL`] marks a block
//! kept uncompressed; anything else is a raw deflate stream.

use super::error::{EntryError, EntryResult};
use crate::source::ByteSource;
use binrw::{BinRead, BinWrite};
use flate2::read::DeflateDecoder;
use std::io::{Cursor, Read};
use tracing::{trace, warn};

/// Stored length marking an uncompressed block
pub const LITERAL_BLOCK_SENTINEL: u32 = 32000;

/// Size of a block header
pub const BLOCK_HEADER_SIZE: usize = 16;

/// Maximum allowed decompression size (1 GB)
///
/// Limits inflate output so a corrupted length cannot exhaust memory.
pub const MAX_DECOMPRESSION_SIZE: usize = 1024 * 1024 * 1024;

/// Header preceding each block's stored bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct BlockHeader {
    /// Size of this header
    pub header_size: u32,
    /// Unused
    pub reserved: u32,
    /// Number of stored bytes following the header
    pub compressed_length: u32,
    /// Size of the block after decompression
    pub decompressed_length: u32,
}

impl BlockHeader {
    /// Whether the stored bytes are the literal payload
    pub fn is_literal(&self) -> bool {
        self.compressed_length == LITERAL_BLOCK_SENTINEL
    }
}

/// Read one block at the current position and return its decompressed bytes
pub async fn read_block<S: ByteSource + ?Sized>(source: &mut S) -> EntryResult<Vec<u8>> {
    let offset = source.position();
    let raw_header = source.read(BLOCK_HEADER_SIZE).await?;
    let header = BlockHeader::read(&mut Cursor::new(raw_header))?;
    let stored = source.read(header.compressed_length as usize).await?;

    trace!(
        "Block at {:#x}: stored={}, decompressed={}, literal={}",
        offset,
        header.compressed_length,
        header.decompressed_length,
        header.is_literal()
    );

    decompress_block(&header, stored, offset)
}

/// Turn a block's stored bytes into its payload
///
/// `offset` is only used for error reporting.
pub fn decompress_block(header: &BlockHeader, stored: Vec<u8>, offset: u64) -> EntryResult<Vec<u8>> {
    if header.is_literal() {
        return Ok(stored);
    }

    let mut decoder = DeflateDecoder::new(stored.as_slice());
    let capacity = (header.decompressed_length as usize).min(MAX_DECOMPRESSION_SIZE);
    let mut decompressed = Vec::with_capacity(capacity);
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = decoder
            .read(&mut buffer)
            .map_err(|e| EntryError::Decompression {
                offset,
                reason: e.to_string(),
            })?;

        if bytes_read == 0 {
            break;
        }

        if decompressed.len() + bytes_read > MAX_DECOMPRESSION_SIZE {
            return Err(EntryError::TooLarge {
                offset,
                limit: MAX_DECOMPRESSION_SIZE,
            });
        }

        decompressed.extend_from_slice(&buffer[..bytes_read]);
    }

    if decompressed.len() != header.decompressed_length as usize {
        warn!(
            "Block at {:#x} inflated to {} bytes, header declares {}",
            offset,
            decompressed.len(),
            header.decompressed_length
        );
    }

    Ok(decompressed)
}
