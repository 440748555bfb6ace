//! Little-endian primitive readers

use super::{ByteSource, SourceResult};
use crate::hash::{SHA1_DIGEST_SIZE, Sha1Digest};
use async_trait::async_trait;

/// Fixed-width readers layered over any [`ByteSource`]
///
/// All multi-byte integers in SqPack files are little-endian.
#[async_trait]
pub trait ReadPrimitives: ByteSource {
    /// Read a `u16`
    async fn read_u16_le(&mut self) -> SourceResult<u16> {
        let bytes = self.read(2).await?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a `u32`
    async fn read_u32_le(&mut self) -> SourceResult<u32> {
        let bytes = self.read(4).await?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a 6-byte unsigned integer
    async fn read_u48_le(&mut self) -> SourceResult<u64> {
        let bytes = self.read(6).await?;
        let mut padded = [0u8; 8];
        padded[..6].copy_from_slice(&bytes);
        Ok(u64::from_le_bytes(padded))
    }

    /// Read a `u64`
    async fn read_u64_le(&mut self) -> SourceResult<u64> {
        let bytes = self.read(8).await?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes);
        Ok(u64::from_le_bytes(raw))
    }

    /// Read a raw 20-byte SHA-1 digest
    async fn read_sha1(&mut self) -> SourceResult<Sha1Digest> {
        let bytes = self.read(SHA1_DIGEST_SIZE).await?;
        let mut raw = [0u8; SHA1_DIGEST_SIZE];
        raw.copy_from_slice(&bytes);
        Ok(Sha1Digest::from_bytes(raw))
    }
}

impl<S: ByteSource + ?Sized> ReadPrimitives for S {}
