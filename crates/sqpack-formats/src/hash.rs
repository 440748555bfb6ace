//! Path hashing and segment digests
//!
//! SqPack addresses files by two 32-bit hashes: one over the directory part of
//! the path and one over the file name. Both are a CRC-32 of the UTF-8 bytes
//! with the final XOR left out, i.e. `!crc32(bytes)`. External tooling that
//! stores hashes in signed integer columns uses the same bits as `i32`.
//!
//! Segment checksums in the index header are plain SHA-1.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

/// Size of a SHA-1 digest in bytes
pub const SHA1_DIGEST_SIZE: usize = 20;

/// Hash a single path segment (directory or file name)
///
/// The input is hashed exactly as given; callers that want case-insensitive
/// matching must fold case first.
///
/// ```
/// use sqpack_formats::hash::path_hash;
///
/// assert_eq!(path_hash("ui/icon"), path_hash("ui/icon"));
/// assert_ne!(path_hash("ui/icon"), path_hash("UI/Icon"));
/// ```
pub fn path_hash(segment: &str) -> u32 {
    !crc32fast::hash(segment.as_bytes())
}

/// Signed view of [`path_hash`]
pub fn path_hash_signed(segment: &str) -> i32 {
    path_hash(segment) as i32
}

/// SHA-1 digest of a header or segment region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sha1Digest([u8; SHA1_DIGEST_SIZE]);

impl Sha1Digest {
    /// Wrap raw digest bytes
    pub fn from_bytes(bytes: [u8; SHA1_DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Compute the digest of `data`
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        let result = hasher.finalize();
        let mut bytes = [0u8; SHA1_DIGEST_SIZE];
        bytes.copy_from_slice(&result);
        Self(bytes)
    }

    /// Parse from a 40-character hex string
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; SHA1_DIGEST_SIZE];
        hex::decode_to_slice(hex, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; SHA1_DIGEST_SIZE] {
        &self.0
    }

    /// Lowercase hex representation
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Sha1Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
