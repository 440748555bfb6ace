//! Data entry header and content types

use binrw::{BinRead, BinWrite};
use std::fmt;

/// Size of the common entry header
pub const ENTRY_HEADER_SIZE: usize = 24;

/// Kind of payload stored in a data entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ContentType {
    /// Reserved slot without payload
    Placeholder = 1,
    /// Generic file split into compressed blocks
    Binary = 2,
    /// Model file
    Model = 3,
    /// Texture split into mip frames
    Texture = 4,
}

impl ContentType {
    /// Parse from the raw tag
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Placeholder),
            2 => Some(Self::Binary),
            3 => Some(Self::Model),
            4 => Some(Self::Texture),
            _ => None,
        }
    }

    /// Raw tag value
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Placeholder => "placeholder",
            Self::Binary => "binary",
            Self::Model => "model",
            Self::Texture => "texture",
        };
        f.write_str(name)
    }
}

/// Common header at the start of every data entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct DataEntryHeader {
    /// Length of the header including the block table; payload starts here
    pub header_length: u32,
    /// Raw content type tag
    pub content_type: u32,
    /// Size of the reconstructed file
    pub uncompressed_size: u32,
    /// Unused
    pub reserved: u32,
    /// Largest block buffer needed to decode the entry
    pub block_buffer_size: u32,
    /// Number of blocks (binary) or frames (texture)
    pub num_blocks: u32,
}

impl DataEntryHeader {
    /// Parsed content type, if the tag is known
    pub fn kind(&self) -> Option<ContentType> {
        ContentType::from_u32(self.content_type)
    }
}
