//! Block tables for binary and texture entries

use binrw::{BinRead, BinWrite};

/// Size of a binary block descriptor
pub const BINARY_BLOCK_SIZE: usize = 8;

/// Size of a texture frame descriptor
pub const TEXTURE_FRAME_SIZE: usize = 22;

/// Block descriptor of a binary entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct BinaryBlock {
    /// Offset of the block relative to the payload start
    pub offset: u32,
    /// Stored size of the block
    pub compressed_size: u16,
    /// Size after decompression
    pub decompressed_size: u16,
}

/// Frame descriptor of a texture entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct TextureFrame {
    /// Length of the raw header bytes preceding the frame's block
    pub frame_offset: u32,
    /// Stored size of the frame
    pub frame_size: u32,
    /// Size of the frame after decompression
    pub uncompressed_size: u32,
    /// Offset into the nested block-size table
    pub block_table_offset: u32,
    /// Number of entries in the nested block-size table
    pub block_table_count: u32,
    /// Size of the frame's first block
    pub block_size: u16,
}
