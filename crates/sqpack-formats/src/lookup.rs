//! Two-level hash lookup table
//!
//! Maps a directory hash to the file hashes stored under it, and each file
//! hash to the place its data entry lives. Buckets are kept sorted so that
//! serialized snapshots are stable between runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Location of a data entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageLocation {
    /// Data file number recorded in the index
    pub data_file: u32,
    /// Absolute byte offset of the entry inside the data file
    pub offset: u64,
}

impl StorageLocation {
    /// Create a location
    pub const fn new(data_file: u32, offset: u64) -> Self {
        Self { data_file, offset }
    }
}

/// Files under one directory hash
pub type FileBucket = BTreeMap<u32, StorageLocation>;

/// Directory hash → file hash → location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupStore {
    buckets: BTreeMap<u32, FileBucket>,
}

impl LookupStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a location unless the pair is already present
    ///
    /// The first location recorded for a `(path_hash, file_hash)` pair wins;
    /// later duplicates are dropped. Returns whether the entry was inserted.
    pub fn insert_first(&mut self, path_hash: u32, file_hash: u32, location: StorageLocation) -> bool {
        match self.buckets.entry(path_hash).or_default().entry(file_hash) {
            Entry::Vacant(slot) => {
                slot.insert(location);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Look up a pair
    pub fn get(&self, path_hash: u32, file_hash: u32) -> Option<&StorageLocation> {
        self.buckets.get(&path_hash)?.get(&file_hash)
    }

    /// Whether a pair is present
    pub fn contains(&self, path_hash: u32, file_hash: u32) -> bool {
        self.get(path_hash, file_hash).is_some()
    }

    /// Whether any file is stored under a directory hash
    pub fn contains_directory(&self, path_hash: u32) -> bool {
        self.buckets.contains_key(&path_hash)
    }

    /// Files stored under a directory hash
    pub fn bucket(&self, path_hash: u32) -> Option<&FileBucket> {
        self.buckets.get(&path_hash)
    }

    /// Remove a pair, dropping the directory bucket once it is empty
    pub fn remove(&mut self, path_hash: u32, file_hash: u32) -> Option<StorageLocation> {
        let bucket = self.buckets.get_mut(&path_hash)?;
        let removed = bucket.remove(&file_hash);
        if bucket.is_empty() {
            self.buckets.remove(&path_hash);
        }
        removed
    }

    /// Total number of file entries
    pub fn len(&self) -> usize {
        self.buckets.values().map(BTreeMap::len).sum()
    }

    /// Whether the store has no entries
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of directory buckets
    pub fn directory_count(&self) -> usize {
        self.buckets.len()
    }

    /// Iterate over `(path_hash, file_hash, location)` in hash order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &StorageLocation)> {
        self.buckets.iter().flat_map(|(path_hash, bucket)| {
            bucket
                .iter()
                .map(move |(file_hash, location)| (*path_hash, *file_hash, location))
        })
    }
}
