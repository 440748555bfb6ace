//! Segment table entries and checksum verification

use super::error::{IndexError, IndexResult};
use crate::hash::Sha1Digest;
use crate::source::{ByteSource, ReadPrimitives};
use tracing::{debug, error};

/// Number of segments described by the segment table
pub const SEGMENT_COUNT: u8 = 4;

/// Reserved bytes after each segment descriptor
pub const SEGMENT_RESERVED: u64 = 0x28;

/// Extra reserved bytes after the first segment descriptor
pub const FIRST_SEGMENT_EXTRA: u64 = 4;

/// One entry of the segment table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentDescriptor {
    /// Position in the table (1-4)
    pub number: u8,
    /// Index field stored in the descriptor
    pub index: u32,
    /// Absolute offset of the segment payload
    pub offset: u32,
    /// Payload size in bytes
    pub size: u32,
    /// Expected SHA-1 of the payload
    pub expected_hash: Sha1Digest,
}

impl SegmentDescriptor {
    /// Read descriptor `number` from the segment table
    ///
    /// Consumes the descriptor and its trailing reserved bytes.
    pub async fn read<S: ByteSource + ?Sized>(source: &mut S, number: u8) -> IndexResult<Self> {
        let index = source.read_u32_le().await?;
        let offset = source.read_u32_le().await?;
        let size = source.read_u32_le().await?;
        let expected_hash = source.read_sha1().await?;

        source.skip(SEGMENT_RESERVED).await?;
        if number == 1 {
            source.skip(FIRST_SEGMENT_EXTRA).await?;
        }

        Ok(Self {
            number,
            index,
            offset,
            size,
            expected_hash,
        })
    }

    /// Exclusive end offset of the payload
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.size)
    }

    /// Check payload bytes against the stored digest
    pub fn verify(&self, payload: &[u8]) -> IndexResult<()> {
        let actual = Sha1Digest::of(payload);
        if actual != self.expected_hash {
            error!(
                "Hash mismatch in segment {}: expected \"{}\", got \"{}\"",
                self.number, self.expected_hash, actual
            );
            return Err(IndexError::Integrity {
                segment: self.number,
                expected: self.expected_hash,
                actual,
            });
        }
        Ok(())
    }

    /// Read the payload, verify it, and restore the source position
    ///
    /// Returns the verified payload bytes.
    pub async fn load_verified<S: ByteSource + ?Sized>(&self, source: &mut S) -> IndexResult<Vec<u8>> {
        let resume_at = source.position();

        source.seek(u64::from(self.offset)).await?;
        let payload = source.read(self.size as usize).await?;
        self.verify(&payload)?;
        debug!(
            "Segment {} verified: offset={:#x}, size={}, sha1={}",
            self.number, self.offset, self.size, self.expected_hash
        );

        source.seek(resume_at).await?;
        Ok(payload)
    }
}
