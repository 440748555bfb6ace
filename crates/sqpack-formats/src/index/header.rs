//! Container header

use super::error::{IndexError, IndexResult};
use crate::hash::Sha1Digest;
use crate::source::{ByteSource, ReadPrimitives};
use tracing::debug;

/// `"SqPack"` read as a little-endian 48-bit integer
pub const SQPACK_MAGIC: u64 = 0x6B63_6150_7153;

/// Container type code of index files
pub const INDEX_CONTAINER_TYPE: u32 = 2;

/// Offset of the header SHA-1
pub const HEADER_HASH_OFFSET: u64 = 0x3C0;

/// Reserved bytes between the magic and the header length
const RESERVED_AFTER_MAGIC: u64 = 6;

/// Fixed container header at the start of every SqPack file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    /// 48-bit magic
    pub signature: u64,
    /// Offset of the segment table
    pub header_length: u32,
    /// Container type code
    pub container_type: u32,
    /// Stored header digest; read for reference, never verified
    pub header_hash: Sha1Digest,
}

impl ContainerHeader {
    /// Read and validate the header
    ///
    /// Leaves the source positioned at `header_length`, the start of the
    /// segment table.
    pub async fn read<S: ByteSource + ?Sized>(source: &mut S) -> IndexResult<Self> {
        let signature = source.read_u48_le().await?;
        if signature != SQPACK_MAGIC {
            return Err(IndexError::NotAContainer(signature));
        }

        source.skip(RESERVED_AFTER_MAGIC).await?;
        let header_length = source.read_u32_le().await?;
        let _reserved = source.read_u32_le().await?;
        let container_type = source.read_u32_le().await?;
        if container_type != INDEX_CONTAINER_TYPE {
            return Err(IndexError::NotAnIndex(container_type));
        }

        source.seek(HEADER_HASH_OFFSET).await?;
        let header_hash = source.read_sha1().await?;
        source.seek(u64::from(header_length)).await?;

        debug!(
            "Container header: length={:#x}, type={}, hash={}",
            header_length, container_type, header_hash
        );

        Ok(Self {
            signature,
            header_length,
            container_type,
            header_hash,
        })
    }
}
