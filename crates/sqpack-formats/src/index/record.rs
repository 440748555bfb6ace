//! Segment 1 file records

use binrw::{BinRead, BinWrite};

/// Size of one file record
pub const RECORD_SIZE: usize = 16;

/// Multiplier turning a stored offset into a byte offset
pub const OFFSET_UNIT: u64 = 8;

/// One file record from segment 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct IndexRecord {
    /// Hash of the file name
    pub file_hash: u32,
    /// Hash of the directory path
    pub path_hash: u32,
    /// Data offset in 8-byte units
    pub raw_offset: u32,
    /// Unused
    pub reserved: u32,
}

impl IndexRecord {
    /// Byte offset of the data entry
    pub fn byte_offset(&self) -> u64 {
        u64::from(self.raw_offset) * OFFSET_UNIT
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_record_layout() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&0x1111_1111u32.to_le_bytes());
        raw.extend_from_slice(&0x2222_2222u32.to_le_bytes());
        raw.extend_from_slice(&0x10u32.to_le_bytes());
        raw.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(raw.len(), RECORD_SIZE);

        let record = IndexRecord::read(&mut Cursor::new(&raw)).unwrap();
        assert_eq!(record.file_hash, 0x1111_1111);
        assert_eq!(record.path_hash, 0x2222_2222);
        assert_eq!(record.byte_offset(), 0x80);
    }
}
