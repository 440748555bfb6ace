//! Hash table snapshots
//!
//! The snapshot is a JSON copy of the lookup table with every resolved entry
//! removed. It is trusted as a cache: when present it replaces parsing the
//! index for brute-force runs.

use crate::Result;
use sqpack_formats::lookup::LookupStore;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Load a snapshot, or `None` if the file does not exist
pub async fn load(path: &Path) -> Result<Option<LookupStore>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No snapshot at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let store: LookupStore = serde_json::from_slice(&bytes)?;
    info!(
        "Loaded snapshot {}: {} files in {} directories",
        path.display(),
        store.len(),
        store.directory_count()
    );
    Ok(Some(store))
}

/// Write a snapshot, creating parent directories as needed
pub async fn save(path: &Path, store: &LookupStore) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_vec_pretty(store)?;
    tokio::fs::write(path, json).await?;

    info!(
        "Saved snapshot {}: {} files remaining",
        path.display(),
        store.len()
    );
    Ok(())
}
