//! Test utilities for sqpack-rs
//!
//! Builds small synthetic index containers and data files byte by byte, so
//! parsers can be tested without shipping game data. Nothing here depends on
//! the parser crates; hashes and digests are computed directly.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use flate2::Compression;
use flate2::write::DeflateEncoder;
use sha1::{Digest, Sha1};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Offset of the segment table in built index files
pub const HEADER_LENGTH: u32 = 0x400;

/// Offset of the header digest
pub const HEADER_HASH_OFFSET: usize = 0x3C0;

/// Offset of the first segment payload
pub const PAYLOAD_START: usize = 0x800;

/// Stored length marking a literal block
pub const LITERAL_SENTINEL: u32 = 32000;

/// Entry and payload alignment used by [`DataFileBuilder`] and [`EntryBuilder`]
pub const ENTRY_ALIGNMENT: usize = 0x80;

const SEGMENT_RESERVED: usize = 0x28;
const FIRST_SEGMENT_EXTRA: usize = 4;

/// Hash of one path segment, as stored in index records
pub fn segment_hash(segment: &str) -> u32 {
    !crc32fast::hash(segment.as_bytes())
}

/// Directory and file hashes of a full path, split at the last `/`
pub fn hash_pair(full_path: &str) -> (u32, u32) {
    let (directory, file) = full_path
        .rsplit_once('/')
        .unwrap_or_else(|| panic!("{full_path:?} has no directory"));
    (segment_hash(directory), segment_hash(file))
}

fn sha1(data: &[u8]) -> [u8; 20] {
    let mut out = [0u8; 20];
    out.copy_from_slice(&Sha1::digest(data));
    out
}

fn align(data: &mut Vec<u8>, alignment: usize) {
    let padded = data.len().div_ceil(alignment) * alignment;
    data.resize(padded, 0);
}

/// Builder for index container files
#[derive(Debug, Clone)]
pub struct IndexFileBuilder {
    records: Vec<(u32, u32, u32)>,
    container_type: u32,
    data_file: u32,
    overrides: [Option<Vec<u8>>; 4],
}

impl Default for IndexFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexFileBuilder {
    /// Empty index container with the index type code
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            container_type: 2,
            data_file: 0,
            overrides: [None, None, None, None],
        }
    }

    /// Add a file record; `byte_offset` must be a multiple of 8
    pub fn file(mut self, full_path: &str, byte_offset: u64) -> Self {
        assert_eq!(byte_offset % 8, 0, "offsets are stored in 8-byte units");
        let (directory, file) = hash_pair(full_path);
        self.records.push((file, directory, (byte_offset / 8) as u32));
        self
    }

    /// Override the container type code
    pub fn container_type(mut self, container_type: u32) -> Self {
        self.container_type = container_type;
        self
    }

    /// Set the `index` field of segment 1
    pub fn data_file(mut self, data_file: u32) -> Self {
        self.data_file = data_file;
        self
    }

    /// Replace the payload of segment `number` (1-4)
    ///
    /// Overriding segment 1 discards the records added with [`Self::file`].
    pub fn segment_payload(mut self, number: u8, payload: Vec<u8>) -> Self {
        self.overrides[usize::from(number - 1)] = Some(payload);
        self
    }

    fn payloads(&self) -> [Vec<u8>; 4] {
        let records: Vec<u8> = self
            .records
            .iter()
            .flat_map(|&(file, directory, offset)| {
                [file, directory, offset, 0]
                    .into_iter()
                    .flat_map(u32::to_le_bytes)
            })
            .collect();

        let mut payloads = [records, Vec::new(), Vec::new(), Vec::new()];
        for (slot, payload) in self.overrides.iter().enumerate() {
            if let Some(payload) = payload {
                payloads[slot].clone_from(payload);
            }
        }
        payloads
    }

    /// Absolute `(offset, size)` of segment `number` in the built file
    pub fn segment_range(&self, number: u8) -> (usize, usize) {
        let payloads = self.payloads();
        let mut offset = PAYLOAD_START;
        for payload in &payloads[..usize::from(number - 1)] {
            offset += payload.len();
        }
        (offset, payloads[usize::from(number - 1)].len())
    }

    /// Serialize the container
    pub fn build(&self) -> Vec<u8> {
        let payloads = self.payloads();

        let mut data = Vec::with_capacity(PAYLOAD_START);
        data.extend_from_slice(b"SqPack");
        data.extend_from_slice(&[0u8; 6]);
        data.extend_from_slice(&HEADER_LENGTH.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&self.container_type.to_le_bytes());
        data.resize(HEADER_HASH_OFFSET, 0);
        let header_hash = sha1(&data);
        data.extend_from_slice(&header_hash);
        data.resize(HEADER_LENGTH as usize, 0);

        data.extend_from_slice(&(HEADER_LENGTH).to_le_bytes());
        let mut offset = PAYLOAD_START;
        for (slot, payload) in payloads.iter().enumerate() {
            let index = if slot == 0 { self.data_file } else { 0 };
            data.extend_from_slice(&index.to_le_bytes());
            data.extend_from_slice(&(offset as u32).to_le_bytes());
            data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            data.extend_from_slice(&sha1(payload));
            data.extend_from_slice(&[0u8; SEGMENT_RESERVED]);
            if slot == 0 {
                data.extend_from_slice(&[0u8; FIRST_SEGMENT_EXTRA]);
            }
            offset += payload.len();
        }

        data.resize(PAYLOAD_START, 0);
        for payload in &payloads {
            data.extend_from_slice(payload);
        }
        data
    }
}

/// One payload block: 16-byte header plus stored bytes
#[derive(Debug, Clone)]
pub struct EncodedBlock {
    stored: Vec<u8>,
    compressed_length: u32,
    decompressed_length: u32,
}

impl EncodedBlock {
    /// Raw deflate block
    pub fn deflate(data: Vec<u8>) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&data).unwrap();
        let stored = encoder.finish().unwrap();
        Self {
            compressed_length: stored.len() as u32,
            decompressed_length: data.len() as u32,
            stored,
        }
    }

    /// Literal block; must be exactly [`LITERAL_SENTINEL`] bytes
    pub fn literal(data: Vec<u8>) -> Self {
        assert_eq!(data.len(), LITERAL_SENTINEL as usize, "literal blocks are 32000 bytes");
        Self {
            compressed_length: LITERAL_SENTINEL,
            decompressed_length: LITERAL_SENTINEL,
            stored: data,
        }
    }

    /// Decompressed size
    pub fn decompressed_len(&self) -> usize {
        self.decompressed_length as usize
    }

    /// Header and stored bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 + self.stored.len());
        for value in [16u32, 0, self.compressed_length, self.decompressed_length] {
            out.extend_from_slice(&value.to_le_bytes());
        }
        out.extend_from_slice(&self.stored);
        out
    }
}

#[derive(Debug, Clone)]
enum EntryBody {
    Placeholder,
    Binary(Vec<EncodedBlock>),
    Texture(Vec<(Vec<u8>, EncodedBlock)>),
    Model([u16; 11]),
}

/// Builder for a single data entry
#[derive(Debug, Clone)]
pub struct EntryBuilder {
    body: EntryBody,
    content_type: u32,
}

impl EntryBuilder {
    /// Entry without payload
    pub fn placeholder() -> Self {
        Self {
            body: EntryBody::Placeholder,
            content_type: 1,
        }
    }

    /// Binary entry made of the given blocks
    pub fn binary(blocks: Vec<EncodedBlock>) -> Self {
        Self {
            body: EntryBody::Binary(blocks),
            content_type: 2,
        }
    }

    /// Binary entry holding `contents`, split into 16000-byte deflate blocks
    pub fn binary_file(contents: &[u8]) -> Self {
        let blocks = if contents.is_empty() {
            vec![EncodedBlock::deflate(Vec::new())]
        } else {
            contents
                .chunks(16000)
                .map(|chunk| EncodedBlock::deflate(chunk.to_vec()))
                .collect()
        };
        Self::binary(blocks)
    }

    /// Texture entry; each frame is `(raw frame header, block)`
    pub fn texture(frames: Vec<(Vec<u8>, EncodedBlock)>) -> Self {
        Self {
            body: EntryBody::Texture(frames),
            content_type: 4,
        }
    }

    /// Model entry with the given per-slot block counts (11 slots)
    pub fn model(block_counts: &[u16]) -> Self {
        let mut counts = [0u16; 11];
        counts.copy_from_slice(block_counts);
        Self {
            body: EntryBody::Model(counts),
            content_type: 3,
        }
    }

    /// Override the content type tag
    pub fn content_type(mut self, content_type: u32) -> Self {
        self.content_type = content_type;
        self
    }

    /// Serialize the entry, header first
    pub fn build(&self) -> Vec<u8> {
        let (table, payload, num_blocks, uncompressed) = match &self.body {
            EntryBody::Placeholder => (Vec::new(), Vec::new(), 0, 0),
            EntryBody::Binary(blocks) => {
                let mut table = Vec::new();
                let mut payload = Vec::new();
                for block in blocks {
                    let bytes = block.to_bytes();
                    table.extend_from_slice(&(payload.len() as u32).to_le_bytes());
                    table.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
                    table.extend_from_slice(&(block.decompressed_len() as u16).to_le_bytes());
                    payload.extend_from_slice(&bytes);
                    align(&mut payload, ENTRY_ALIGNMENT);
                }
                let total = blocks.iter().map(EncodedBlock::decompressed_len).sum::<usize>();
                (table, payload, blocks.len(), total)
            }
            EntryBody::Texture(frames) => {
                let mut table = Vec::new();
                let mut payload = Vec::new();
                for (frame_header, block) in frames {
                    let bytes = block.to_bytes();
                    let frame_size = frame_header.len() + bytes.len();
                    for value in [
                        frame_header.len() as u32,
                        frame_size as u32,
                        (frame_header.len() + block.decompressed_len()) as u32,
                        0,
                        1,
                    ] {
                        table.extend_from_slice(&value.to_le_bytes());
                    }
                    table.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
                    payload.extend_from_slice(frame_header);
                    payload.extend_from_slice(&bytes);
                }
                let total = frames
                    .iter()
                    .map(|(h, b)| h.len() + b.decompressed_len())
                    .sum::<usize>();
                (table, payload, frames.len(), total)
            }
            EntryBody::Model(counts) => {
                let mut table = Vec::new();
                for _ in 0..33 {
                    table.extend_from_slice(&0u32.to_le_bytes());
                }
                let mut index = 0u16;
                for count in counts {
                    table.extend_from_slice(&index.to_le_bytes());
                    index += count;
                }
                for count in counts {
                    table.extend_from_slice(&count.to_le_bytes());
                }
                table.extend_from_slice(&1u16.to_le_bytes());
                table.extend_from_slice(&1u16.to_le_bytes());
                table.extend_from_slice(&[3, 0, 0, 0]);
                for _ in 0..index {
                    table.extend_from_slice(&0x80u16.to_le_bytes());
                }
                (table, Vec::new(), 0, 0)
            }
        };

        let mut entry = Vec::new();
        let mut header_length = 24 + table.len();
        header_length = header_length.div_ceil(ENTRY_ALIGNMENT) * ENTRY_ALIGNMENT;
        for value in [
            header_length as u32,
            self.content_type,
            uncompressed as u32,
            0,
            16000,
            num_blocks as u32,
        ] {
            entry.extend_from_slice(&value.to_le_bytes());
        }
        entry.extend_from_slice(&table);
        entry.resize(header_length, 0);
        entry.extend_from_slice(&payload);
        entry
    }
}

/// Builder for a data file made of aligned entries
#[derive(Debug, Clone, Default)]
pub struct DataFileBuilder {
    data: Vec<u8>,
}

impl DataFileBuilder {
    /// Data file starting with one alignment unit of filler
    pub fn new() -> Self {
        Self {
            data: vec![0u8; ENTRY_ALIGNMENT],
        }
    }

    /// Append an entry and return its byte offset
    pub fn push(&mut self, entry: &[u8]) -> u64 {
        align(&mut self.data, ENTRY_ALIGNMENT);
        let offset = self.data.len() as u64;
        self.data.extend_from_slice(entry);
        offset
    }

    /// Finished file bytes
    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// Builder for an index and `.dat0` pair on disk
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    stem: String,
    index: IndexFileBuilder,
    data: DataFileBuilder,
}

impl ArchiveBuilder {
    /// Archive named `<stem>.index` / `<stem>.dat0`
    pub fn new(stem: &str) -> Self {
        Self {
            stem: stem.to_string(),
            index: IndexFileBuilder::new(),
            data: DataFileBuilder::new(),
        }
    }

    /// Store a file as a binary entry
    pub fn file(self, full_path: &str, contents: &[u8]) -> Self {
        let entry = EntryBuilder::binary_file(contents).build();
        self.entry(full_path, &entry)
    }

    /// Store a prebuilt entry under `full_path`
    pub fn entry(mut self, full_path: &str, entry: &[u8]) -> Self {
        let offset = self.data.push(entry);
        self.index = self.index.file(full_path, offset);
        self
    }

    /// Write both files into `dir` and return the index path
    pub fn write_to(self, dir: &Path) -> std::io::Result<PathBuf> {
        let index_path = dir.join(format!("{}.index", self.stem));
        std::fs::write(&index_path, self.index.build())?;
        std::fs::write(dir.join(format!("{}.dat0", self.stem)), self.data.build())?;
        Ok(index_path)
    }

    /// Write only the index file into `dir` and return its path
    pub fn write_index_only(self, dir: &Path) -> std::io::Result<PathBuf> {
        let index_path = dir.join(format!("{}.index", self.stem));
        std::fs::write(&index_path, self.index.build())?;
        Ok(index_path)
    }
}
