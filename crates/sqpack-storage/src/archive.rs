//! Archive sessions
//!
//! An [`Archive`] works on one index file. Brute-force runs use the snapshot
//! when one exists and persist the shrunken table afterwards. Lookups and
//! extraction always parse the index afresh, because the snapshot no longer
//! contains the entries that were resolved.

use crate::config::ArchiveConfig;
use crate::resolver::{BruteForceResolver, Resolution, split_full_path};
use crate::results::ConfirmedPaths;
use crate::{Result, StorageError, snapshot, sql};
use sqpack_formats::entry::{EntryContent, decode_entry};
use sqpack_formats::hash::path_hash;
use sqpack_formats::index::{ParsedIndex, parse_index};
use sqpack_formats::lookup::{LookupStore, StorageLocation};
use sqpack_formats::source::{ByteSource, FileSource};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::AtomicBool;
use tracing::{info, warn};

/// Hashes and location of one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathLookup {
    /// Lowercased path
    pub path: String,
    /// Hash of the directory part
    pub path_hash: u32,
    /// Hash of the file name
    pub file_hash: u32,
    /// Where the entry lives, if the index has it
    pub location: Option<StorageLocation>,
}

/// Outcome of a brute-force run after persistence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BruteForceReport {
    /// Paths discovered by this run
    pub found: Vec<String>,
    /// Candidates rejected as invalid
    pub invalid: Vec<String>,
    /// Number of candidates tested
    pub tested: u64,
    /// Whether the run was stopped early
    pub interrupted: bool,
    /// Entries still unresolved
    pub remaining: usize,
    /// Size of the confirmed path file after merging
    pub confirmed: usize,
}

/// Outcome of a batch extraction
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Files written
    pub extracted: Vec<PathBuf>,
    /// Paths that could not be extracted, with the reason
    pub failed: Vec<(String, StorageError)>,
}

/// Session on one index file and its artifacts
#[derive(Debug, Clone)]
pub struct Archive {
    config: ArchiveConfig,
}

impl Archive {
    /// Open a session; the index file must exist
    pub fn open(config: ArchiveConfig) -> Result<Self> {
        if !config.index_path.is_file() {
            return Err(StorageError::MissingResource(config.index_path));
        }
        Ok(Self { config })
    }

    /// Session configuration
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Parse and verify the index file
    ///
    /// A checksum mismatch comes back as [`StorageError::Integrity`].
    pub async fn parse_index(&self) -> Result<ParsedIndex> {
        let mut source = FileSource::open(&self.config.index_path).await?;
        let index = parse_index(&mut source).await?;
        Ok(index)
    }

    /// Lookup table for brute forcing: the snapshot if present, else a fresh parse
    pub async fn load_lookup(&self) -> Result<LookupStore> {
        if let Some(store) = snapshot::load(&self.config.snapshot_path()).await? {
            return Ok(store);
        }
        Ok(self.parse_index().await?.lookup)
    }

    /// Hash a path and look it up in a freshly parsed index
    pub async fn lookup(&self, path: &str) -> Result<PathLookup> {
        let index = self.parse_index().await?;
        lookup_in(&index.lookup, path)
    }

    /// Run candidates against the unresolved entries and persist the results
    pub async fn brute_force<I, S>(&self, candidates: I) -> Result<BruteForceReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.brute_force_until(candidates, &AtomicBool::new(false))
            .await
    }

    /// Like [`Self::brute_force`], stopping early once `stop` is raised
    pub async fn brute_force_until<I, S>(
        &self,
        candidates: I,
        stop: &AtomicBool,
    ) -> Result<BruteForceReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolver = BruteForceResolver::new(self.load_lookup().await?);
        let resolution = resolver.resolve_until(candidates, stop);
        self.persist(resolver.into_store(), resolution).await
    }

    /// Record a finished resolution
    ///
    /// Without hits nothing is written. Otherwise the hits are merged into
    /// the confirmed path file and the shrunken table replaces the snapshot.
    pub async fn persist(
        &self,
        store: LookupStore,
        resolution: Resolution,
    ) -> Result<BruteForceReport> {
        let mut report = BruteForceReport {
            found: resolution.found,
            invalid: resolution.invalid,
            tested: resolution.tested,
            interrupted: resolution.interrupted,
            remaining: store.len(),
            confirmed: 0,
        };

        let results_path = self.config.results_path();
        if report.found.is_empty() {
            info!("Nothing found in {} candidates", report.tested);
            report.confirmed = ConfirmedPaths::load(&results_path).await?.len();
            return Ok(report);
        }

        let mut confirmed = ConfirmedPaths::load(&results_path).await?;
        confirmed.merge(report.found.iter().cloned());
        confirmed.save(&results_path).await?;
        snapshot::save(&self.config.snapshot_path(), &store).await?;
        report.confirmed = confirmed.len();

        info!(
            "Found {} paths ({} confirmed, {} unresolved)",
            report.found.len(),
            report.confirmed,
            report.remaining
        );
        Ok(report)
    }

    /// Decode the entry stored under `path`
    pub async fn read_entry(&self, path: &str) -> Result<Vec<u8>> {
        let index = self.parse_index().await?;
        let mut data = self.open_data_file().await?;
        read_entry_in(&index.lookup, &mut data, path).await
    }

    /// Extract one path under the extraction directory
    pub async fn extract(&self, path: &str) -> Result<PathBuf> {
        let payload = self.read_entry(path).await?;
        self.write_extracted(path, &payload).await
    }

    /// Extract every confirmed path; failures are collected per path
    ///
    /// Only errors affecting the whole archive (index integrity, missing data
    /// file) abort the batch.
    pub async fn extract_confirmed(&self) -> Result<ExtractReport> {
        let confirmed = ConfirmedPaths::load(&self.config.results_path()).await?;
        let index = self.parse_index().await?;
        let mut data = self.open_data_file().await?;
        let mut report = ExtractReport::default();

        for path in confirmed.iter() {
            let outcome = match read_entry_in(&index.lookup, &mut data, path).await {
                Ok(payload) => self.write_extracted(path, &payload).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(written) => report.extracted.push(written),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Can not extract \"{}\": {}", path, e);
                    report.failed.push((path.to_string(), e));
                }
            }
        }

        info!(
            "Extracted {} files ({} failed) to {}",
            report.extracted.len(),
            report.failed.len(),
            self.config.extract_dir.display()
        );
        Ok(report)
    }

    /// Write the SQL export of the confirmed path file
    pub async fn export_sql(&self) -> Result<PathBuf> {
        let confirmed = ConfirmedPaths::load(&self.config.results_path()).await?;
        let script = sql::render(confirmed.iter(), &self.config.archive_id());

        let path = self.config.sql_path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, script).await?;

        info!("Exported {} paths to {}", confirmed.len(), path.display());
        Ok(path)
    }

    async fn open_data_file(&self) -> Result<FileSource> {
        let path = self.config.data_path();
        if !tokio::fs::try_exists(&path).await? {
            return Err(StorageError::MissingResource(path));
        }
        Ok(FileSource::open(&path).await?)
    }

    async fn write_extracted(&self, path: &str, payload: &[u8]) -> Result<PathBuf> {
        let output = self.config.extract_dir.join(relative_output_path(path)?);
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&output, payload).await?;
        info!("{}", output.display());
        Ok(output)
    }
}

fn lookup_in(lookup: &LookupStore, path: &str) -> Result<PathLookup> {
    let path = path.to_lowercase();
    let (directory, file) = split_full_path(&path)?;
    let directory_hash = path_hash(directory);
    let file_hash = path_hash(file);
    let location = lookup.get(directory_hash, file_hash).copied();

    Ok(PathLookup {
        path,
        path_hash: directory_hash,
        file_hash,
        location,
    })
}

async fn read_entry_in<S: ByteSource + ?Sized>(
    lookup: &LookupStore,
    data: &mut S,
    path: &str,
) -> Result<Vec<u8>> {
    let found = lookup_in(lookup, path)?;
    let location = found
        .location
        .ok_or_else(|| StorageError::NotFound(found.path.clone()))?;

    let entry = decode_entry(data, location.offset).await?;
    match entry.content {
        EntryContent::Binary(payload) | EntryContent::Texture(payload) => Ok(payload),
        EntryContent::Unknown(tag) => Err(StorageError::Decode(format!(
            "unsupported content type {tag} at offset {:#x}",
            location.offset
        ))),
        EntryContent::Placeholder | EntryContent::Model { .. } => {
            Err(StorageError::Decode(format!(
                "{} entry at offset {:#x} has no extractable payload",
                entry
                    .header
                    .kind()
                    .map_or_else(|| "unknown".to_string(), |k| k.to_string()),
                location.offset
            )))
        }
    }
}

/// Archive path as a relative filesystem path, rejecting escapes
fn relative_output_path(path: &str) -> Result<PathBuf> {
    let relative = Path::new(path);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || path.is_empty() {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(relative.to_path_buf())
}
