//! Data entry decoding
//!
//! A data entry is a self-describing record inside a `.dat` file. It starts
//! with a [`DataEntryHeader`] whose content type selects the shape of the
//! block table that follows it:
//!
//! ```text
//! entry_start:
//!        header_length  content_type  uncompressed_size  reserved
//!        block_buffer_size  num_blocks
//!        block table (shape depends on content type)
//! entry_start + header_length:
//!        payload blocks
//! ```
//!
//! Each payload block is decoded by [`read_block`], which returns literal
//! blocks verbatim and inflates everything else.

mod block;
mod compression;
mod error;
mod header;
mod model;

pub use block::{BINARY_BLOCK_SIZE, BinaryBlock, TEXTURE_FRAME_SIZE, TextureFrame};
pub use compression::{
    BLOCK_HEADER_SIZE, BlockHeader, LITERAL_BLOCK_SENTINEL, MAX_DECOMPRESSION_SIZE,
    decompress_block, read_block,
};
pub use error::{EntryError, EntryResult};
pub use header::{ContentType, DataEntryHeader, ENTRY_HEADER_SIZE};
pub use model::{LodChunks, MODEL_CHUNK_SLOTS, MODEL_LAYOUT_SIZE, MODEL_LOD_COUNT, ModelLayout};

use crate::source::{ByteSource, ReadPrimitives};
use binrw::BinRead;
use std::io::Cursor;
use tracing::{debug, trace};

/// Decoded content of a data entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContent {
    /// Reserved slot, nothing stored
    Placeholder,
    /// Concatenated block payloads
    Binary(Vec<u8>),
    /// Model layout; geometry is not reconstructed
    Model {
        /// Fixed chunk layout
        layout: ModelLayout,
        /// Stored size of every block, in table order
        block_sizes: Vec<u16>,
    },
    /// Frame headers interleaved with decoded frame blocks
    Texture(Vec<u8>),
    /// Content type tag this decoder does not know
    Unknown(u32),
}

/// A data entry header together with its decoded content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
    /// Common entry header
    pub header: DataEntryHeader,
    /// Decoded content
    pub content: EntryContent,
}

impl DecodedEntry {
    /// Raw bytes of the entry, if this content type produces any
    pub fn into_payload(self) -> Option<Vec<u8>> {
        match self.content {
            EntryContent::Binary(data) | EntryContent::Texture(data) => Some(data),
            EntryContent::Placeholder | EntryContent::Model { .. } | EntryContent::Unknown(_) => {
                None
            }
        }
    }

    /// Parsed content type, if known
    pub fn kind(&self) -> Option<ContentType> {
        self.header.kind()
    }
}

/// Decode the data entry starting at `entry_start`
///
/// Unknown content types are not an error at this level; the entry comes back
/// as [`EntryContent::Unknown`] and callers decide how to report it.
pub async fn decode_entry<S: ByteSource + ?Sized>(
    source: &mut S,
    entry_start: u64,
) -> EntryResult<DecodedEntry> {
    source.seek(entry_start).await?;
    let raw = source.read(ENTRY_HEADER_SIZE).await?;
    let header = DataEntryHeader::read(&mut Cursor::new(raw))?;

    if (header.header_length as usize) < ENTRY_HEADER_SIZE {
        return Err(EntryError::InvalidLayout {
            offset: entry_start,
            reason: format!(
                "header length {} is shorter than the {ENTRY_HEADER_SIZE}-byte entry header",
                header.header_length
            ),
        });
    }

    debug!(
        "Entry at {:#x}: type={}, header_length={}, uncompressed={}, blocks={}",
        entry_start,
        header.content_type,
        header.header_length,
        header.uncompressed_size,
        header.num_blocks
    );

    let payload_start = entry_start + u64::from(header.header_length);
    let content = match header.kind() {
        Some(ContentType::Placeholder) => decode_placeholder(source, payload_start).await?,
        Some(ContentType::Binary) => decode_binary(source, &header, payload_start).await?,
        Some(ContentType::Model) => decode_model(source).await?,
        Some(ContentType::Texture) => decode_texture(source, &header, payload_start).await?,
        None => EntryContent::Unknown(header.content_type),
    };

    Ok(DecodedEntry { header, content })
}

/// Declared sizes are untrusted; never reserve more than one block may inflate to
fn capacity_hint(declared: u32) -> usize {
    (declared as usize).min(MAX_DECOMPRESSION_SIZE)
}

async fn decode_placeholder<S: ByteSource + ?Sized>(
    source: &mut S,
    payload_start: u64,
) -> EntryResult<EntryContent> {
    source.seek(payload_start).await?;
    Ok(EntryContent::Placeholder)
}

async fn decode_binary<S: ByteSource + ?Sized>(
    source: &mut S,
    header: &DataEntryHeader,
    payload_start: u64,
) -> EntryResult<EntryContent> {
    let count = header.num_blocks as usize;
    let table = source.read(count.saturating_mul(BINARY_BLOCK_SIZE)).await?;
    let mut cursor = Cursor::new(table);
    let mut blocks = Vec::with_capacity(count);
    for _ in 0..count {
        blocks.push(BinaryBlock::read(&mut cursor)?);
    }

    let mut data = Vec::with_capacity(capacity_hint(header.uncompressed_size));
    for (i, block) in blocks.iter().enumerate() {
        source
            .seek(payload_start + u64::from(block.offset))
            .await?;
        let decoded = read_block(source).await?;
        trace!("Binary block {}: {} bytes", i, decoded.len());
        data.extend_from_slice(&decoded);
    }

    Ok(EntryContent::Binary(data))
}

async fn decode_model<S: ByteSource + ?Sized>(source: &mut S) -> EntryResult<EntryContent> {
    let raw = source.read(MODEL_LAYOUT_SIZE).await?;
    let layout = ModelLayout::read(&mut Cursor::new(raw))?;

    let count = layout.block_count();
    let mut block_sizes = Vec::with_capacity(count);
    for _ in 0..count {
        block_sizes.push(source.read_u16_le().await?);
    }

    debug!(
        "Model layout: {} meshes, {} materials, {} lods, {} blocks, {} bytes uncompressed",
        layout.mesh_count,
        layout.material_count,
        layout.lod_count,
        count,
        layout.total_uncompressed()
    );

    Ok(EntryContent::Model {
        layout,
        block_sizes,
    })
}

async fn decode_texture<S: ByteSource + ?Sized>(
    source: &mut S,
    header: &DataEntryHeader,
    payload_start: u64,
) -> EntryResult<EntryContent> {
    let count = header.num_blocks as usize;
    let table = source.read(count.saturating_mul(TEXTURE_FRAME_SIZE)).await?;
    let mut cursor = Cursor::new(table);
    let mut frames = Vec::with_capacity(count);
    for _ in 0..count {
        frames.push(TextureFrame::read(&mut cursor)?);
    }

    source.seek(payload_start).await?;

    let mut data = Vec::with_capacity(capacity_hint(header.uncompressed_size));
    for (i, frame) in frames.iter().enumerate() {
        let frame_header = source.read(frame.frame_offset as usize).await?;
        data.extend_from_slice(&frame_header);
        let decoded = read_block(source).await?;
        trace!(
            "Texture frame {}: {} header bytes, {} block bytes",
            i,
            frame_header.len(),
            decoded.len()
        );
        data.extend_from_slice(&decoded);
    }

    Ok(EntryContent::Texture(data))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use pretty_assertions::assert_eq;
    use sqpack_test_utils::{EncodedBlock, EntryBuilder};

    #[tokio::test]
    async fn test_binary_entry_with_literal_blocks() {
        let first = vec![0x11u8; LITERAL_BLOCK_SENTINEL as usize];
        let second = vec![0x22u8; LITERAL_BLOCK_SENTINEL as usize];
        let entry = EntryBuilder::binary(vec![
            EncodedBlock::literal(first.clone()),
            EncodedBlock::literal(second.clone()),
        ])
        .build();

        let decoded = decode_entry(&mut MemorySource::new(entry), 0).await.unwrap();
        assert_eq!(decoded.kind(), Some(ContentType::Binary));
        assert_eq!(decoded.header.num_blocks, 2);

        let payload = decoded.into_payload().unwrap();
        assert_eq!(payload.len(), 64000);
        assert_eq!(&payload[..32000], first.as_slice());
        assert_eq!(&payload[32000..], second.as_slice());
    }

    #[tokio::test]
    async fn test_binary_entry_with_deflate_blocks() {
        let entry = EntryBuilder::binary(vec![
            EncodedBlock::deflate(b"hello ".to_vec()),
            EncodedBlock::deflate(b"world".to_vec()),
        ])
        .build();

        // Entries may sit anywhere in a data file
        let mut file = vec![0u8; 0x80];
        file.extend_from_slice(&entry);

        let decoded = decode_entry(&mut MemorySource::new(file), 0x80).await.unwrap();
        assert_eq!(decoded.into_payload().unwrap(), b"hello world".to_vec());
    }

    #[tokio::test]
    async fn test_texture_frames_keep_headers() {
        let entry = EntryBuilder::texture(vec![
            (b"TEXHDR".to_vec(), EncodedBlock::deflate(vec![1u8; 300])),
            (Vec::new(), EncodedBlock::deflate(vec![2u8; 75])),
        ])
        .build();

        let decoded = decode_entry(&mut MemorySource::new(entry), 0).await.unwrap();
        assert_eq!(decoded.kind(), Some(ContentType::Texture));

        let mut expected = b"TEXHDR".to_vec();
        expected.extend(vec![1u8; 300]);
        expected.extend(vec![2u8; 75]);
        assert_eq!(decoded.into_payload().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_placeholder_has_no_payload() {
        let entry = EntryBuilder::placeholder().build();
        let header_length = u64::from(u32::from_le_bytes(entry[0..4].try_into().unwrap()));

        let mut source = MemorySource::new(entry);
        let decoded = decode_entry(&mut source, 0).await.unwrap();
        assert_eq!(decoded.content, EntryContent::Placeholder);
        assert_eq!(source.position(), header_length);
        assert_eq!(decoded.into_payload(), None);
    }

    #[tokio::test]
    async fn test_unknown_content_type() {
        let entry = EntryBuilder::placeholder().content_type(9).build();

        let decoded = decode_entry(&mut MemorySource::new(entry), 0).await.unwrap();
        assert_eq!(decoded.content, EntryContent::Unknown(9));
        assert_eq!(decoded.kind(), None);
        assert_eq!(decoded.into_payload(), None);
    }

    #[tokio::test]
    async fn test_model_layout_is_bookkeeping_only() {
        let entry = EntryBuilder::model(&[3, 0, 2, 0, 0, 0, 0, 0, 1, 0, 0]).build();

        let decoded = decode_entry(&mut MemorySource::new(entry), 0).await.unwrap();
        match &decoded.content {
            EntryContent::Model {
                layout,
                block_sizes,
            } => {
                assert_eq!(layout.block_count(), 6);
                assert_eq!(block_sizes.len(), 6);
            }
            other => unreachable!("expected model, got {other:?}"),
        }
        assert_eq!(decoded.into_payload(), None);
    }

    #[tokio::test]
    async fn test_truncated_block_stream() {
        let mut entry = EntryBuilder::binary(vec![EncodedBlock::deflate(vec![5u8; 1000])]).build();
        let header_length = u32::from_le_bytes(entry[0..4].try_into().unwrap()) as usize;
        // Keep the block header and one stored byte
        entry.truncate(header_length + BLOCK_HEADER_SIZE + 1);

        let err = decode_entry(&mut MemorySource::new(entry), 0).await.unwrap_err();
        assert!(matches!(err, EntryError::Source(_)));
    }

    #[tokio::test]
    async fn test_short_header_length_is_invalid() {
        let mut entry = EntryBuilder::placeholder().build();
        entry[0..4].copy_from_slice(&8u32.to_le_bytes());

        let err = decode_entry(&mut MemorySource::new(entry), 0).await.unwrap_err();
        assert!(matches!(err, EntryError::InvalidLayout { offset: 0, .. }));
    }
}
