//! Model entry layout
//!
//! Model entries describe eleven chunk slots after the common header: the
//! stack and runtime chunks, then vertex, edge and index chunks for each of
//! the three levels of detail. Each slot lists its sizes, offset and the range
//! of the block-size table it occupies. The layout is read for bookkeeping
//! only; geometry is not reconstructed.

use binrw::{BinRead, BinWrite};

/// Number of chunk slots in a model entry
pub const MODEL_CHUNK_SLOTS: usize = 11;

/// Number of levels of detail
pub const MODEL_LOD_COUNT: usize = 3;

/// Size of the fixed model layout following the common header
pub const MODEL_LAYOUT_SIZE: usize = 184;

/// Fixed model metadata following the common entry header
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct ModelLayout {
    /// Decompressed size of each slot
    pub uncompressed_sizes: [u32; MODEL_CHUNK_SLOTS],
    /// Stored size of each slot
    pub compressed_sizes: [u32; MODEL_CHUNK_SLOTS],
    /// Offset of each slot relative to the payload start
    pub offsets: [u32; MODEL_CHUNK_SLOTS],
    /// First block-size table index used by each slot
    pub block_indices: [u16; MODEL_CHUNK_SLOTS],
    /// Number of blocks in each slot
    pub block_counts: [u16; MODEL_CHUNK_SLOTS],
    /// Number of meshes
    pub mesh_count: u16,
    /// Number of materials
    pub material_count: u16,
    /// Number of levels of detail in use
    pub lod_count: u8,
    /// Whether index buffers are streamed
    pub index_buffer_streaming: u8,
    /// Alignment padding
    pub padding: [u8; 2],
}

/// Chunk slots belonging to one level of detail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LodChunks {
    /// Vertex chunk slot
    pub vertex: usize,
    /// Edge chunk slot
    pub edge: usize,
    /// Index chunk slot
    pub index: usize,
}

impl ModelLayout {
    /// Total number of entries in the block-size table
    pub fn block_count(&self) -> usize {
        self.block_counts.iter().map(|&n| usize::from(n)).sum()
    }

    /// Slot numbers for a level of detail (0-2)
    pub fn lod(&self, lod: usize) -> Option<LodChunks> {
        (lod < MODEL_LOD_COUNT).then(|| LodChunks {
            vertex: 2 + lod,
            edge: 2 + MODEL_LOD_COUNT + lod,
            index: 2 + 2 * MODEL_LOD_COUNT + lod,
        })
    }

    /// Sum of decompressed slot sizes
    pub fn total_uncompressed(&self) -> u64 {
        self.uncompressed_sizes.iter().map(|&n| u64::from(n)).sum()
    }
}
