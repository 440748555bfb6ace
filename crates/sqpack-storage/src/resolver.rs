//! Brute-force path resolution
//!
//! The index only stores hashes, so file names are recovered by hashing
//! candidate paths and testing them against the lookup table. Every hit is
//! removed from the table, which therefore only ever shrinks; running the same
//! candidates twice finds nothing the second time.

use crate::{Result, StorageError};
use sqpack_formats::hash::path_hash;
use sqpack_formats::lookup::LookupStore;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Split a full path at its last `/` into directory and file name
///
/// ```
/// use sqpack_storage::split_full_path;
///
/// assert_eq!(split_full_path("a/b/c.tex").unwrap(), ("a/b", "c.tex"));
/// assert!(split_full_path("onlyname").is_err());
/// ```
pub fn split_full_path(full_path: &str) -> Result<(&str, &str)> {
    full_path
        .rsplit_once('/')
        .ok_or_else(|| StorageError::InvalidPath(full_path.to_string()))
}

/// Outcome of one resolution run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Lowercased paths found in the table, in candidate order
    pub found: Vec<String>,
    /// Candidates rejected because they have no directory part
    pub invalid: Vec<String>,
    /// Number of candidates pulled from the sequence
    pub tested: u64,
    /// Whether the run ended because the stop flag was raised
    pub interrupted: bool,
}

/// Tests candidate paths against an owned lookup table
#[derive(Debug, Clone)]
pub struct BruteForceResolver {
    store: LookupStore,
}

impl BruteForceResolver {
    /// Take ownership of a lookup table
    pub fn new(store: LookupStore) -> Self {
        Self { store }
    }

    /// Remaining unresolved entries
    pub fn store(&self) -> &LookupStore {
        &self.store
    }

    /// Hand the (possibly shrunken) table back
    pub fn into_store(self) -> LookupStore {
        self.store
    }

    /// Test one candidate; returns the canonical path on a hit
    pub fn test(&mut self, candidate: &str) -> Result<Option<String>> {
        let canonical = candidate.to_lowercase();
        let (directory, file) = split_full_path(&canonical)?;

        let directory_hash = path_hash(directory);
        if !self.store.contains_directory(directory_hash) {
            return Ok(None);
        }

        let file_hash = path_hash(file);
        if self.store.remove(directory_hash, file_hash).is_none() {
            return Ok(None);
        }

        Ok(Some(canonical))
    }

    /// Drain all candidates
    pub fn resolve<I, S>(&mut self, candidates: I) -> Resolution
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.resolve_until(candidates, &AtomicBool::new(false))
    }

    /// Drain candidates until the sequence ends or `stop` is raised
    ///
    /// Stopping early is not an error; the partial results are returned as
    /// usual with [`Resolution::interrupted`] set.
    pub fn resolve_until<I, S>(&mut self, candidates: I, stop: &AtomicBool) -> Resolution
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolution = Resolution::default();
        let start_len = self.store.len();

        let mut candidates = candidates.into_iter();
        loop {
            if stop.load(Ordering::Relaxed) {
                resolution.interrupted = true;
                break;
            }
            let Some(candidate) = candidates.next() else {
                break;
            };
            resolution.tested += 1;

            let candidate = candidate.as_ref();
            match self.test(candidate) {
                Ok(Some(path)) => {
                    info!("Found {}", path);
                    resolution.found.push(path);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Skipping candidate: {}", e);
                    resolution.invalid.push(candidate.to_string());
                }
            }

            if self.store.is_empty() {
                debug!("Every entry resolved, stopping");
                break;
            }
        }

        debug!(
            "Tested {} candidates: {} found, {} invalid, {} -> {} entries",
            resolution.tested,
            resolution.found.len(),
            resolution.invalid.len(),
            start_len,
            self.store.len()
        );

        resolution
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use sqpack_formats::lookup::StorageLocation;

    fn store_with(paths: &[&str]) -> LookupStore {
        let mut store = LookupStore::new();
        for (i, path) in paths.iter().enumerate() {
            let (directory, file) = split_full_path(path).unwrap();
            store.insert_first(
                path_hash(directory),
                path_hash(file),
                StorageLocation::new(0, i as u64 * 0x80),
            );
        }
        store
    }

    #[test]
    fn test_split_full_path() {
        assert_eq!(split_full_path("a/b/c.tex").unwrap(), ("a/b", "c.tex"));
        assert_eq!(split_full_path("/c.tex").unwrap(), ("", "c.tex"));
        assert!(matches!(
            split_full_path("onlyname"),
            Err(StorageError::InvalidPath(p)) if p == "onlyname"
        ));
    }

    #[test]
    fn test_hits_are_removed() {
        let mut resolver = BruteForceResolver::new(store_with(&[
            "ui/icon/000000/000001.tex",
            "ui/icon/000000/000002.tex",
        ]));

        let resolution = resolver.resolve(["ui/icon/000000/000001.tex", "ui/icon/000000/000009.tex"]);
        assert_eq!(resolution.found, vec!["ui/icon/000000/000001.tex".to_string()]);
        assert_eq!(resolution.tested, 2);
        assert_eq!(resolver.store().len(), 1);
        assert_eq!(resolver.store().directory_count(), 1);
    }

    #[test]
    fn test_emptied_bucket_is_dropped() {
        let mut resolver = BruteForceResolver::new(store_with(&["a/b.tex", "c/d.tex"]));
        resolver.resolve(["a/b.tex"]);
        assert!(!resolver.store().contains_directory(path_hash("a")));
        assert!(resolver.store().contains_directory(path_hash("c")));
    }

    #[test]
    fn test_candidates_are_case_folded() {
        let mut resolver = BruteForceResolver::new(store_with(&["ui/loadingimage/x.tex"]));
        let resolution = resolver.resolve(["UI/LoadingImage/X.TEX"]);
        assert_eq!(resolution.found, vec!["ui/loadingimage/x.tex".to_string()]);
    }

    #[test]
    fn test_invalid_candidates_are_skipped() {
        let mut resolver = BruteForceResolver::new(store_with(&["a/b"]));
        let resolution = resolver.resolve(["nodirectory", "a/b"]);
        assert_eq!(resolution.invalid, vec!["nodirectory".to_string()]);
        assert_eq!(resolution.found, vec!["a/b".to_string()]);
    }

    #[test]
    fn test_second_run_finds_nothing() {
        let mut resolver = BruteForceResolver::new(store_with(&["a/b", "a/c"]));
        let first = resolver.resolve(["a/b", "a/c", "a/d"]);
        assert_eq!(first.found.len(), 2);

        let second = resolver.resolve(["a/b", "a/c", "a/d"]);
        assert!(second.found.is_empty());
    }

    #[test]
    fn test_stop_flag_ends_run() {
        let mut resolver = BruteForceResolver::new(store_with(&["a/b"]));
        let stop = AtomicBool::new(true);
        let resolution = resolver.resolve_until(["a/b"], &stop);
        assert!(resolution.interrupted);
        assert_eq!(resolution.tested, 0);
        assert_eq!(resolver.store().len(), 1);
    }

    #[test]
    fn test_stop_raised_mid_run() {
        let mut resolver = BruteForceResolver::new(store_with(&["a/b", "a/z"]));
        let stop = AtomicBool::new(false);
        let candidates = ["a/b", "a/x", "a/z"].into_iter().inspect(|c| {
            if *c == "a/x" {
                stop.store(true, Ordering::Relaxed);
            }
        });

        let resolution = resolver.resolve_until(candidates, &stop);
        assert!(resolution.interrupted);
        assert_eq!(resolution.found, vec!["a/b".to_string()]);
        assert_eq!(resolution.tested, 2);
    }

    proptest! {
        #[test]
        fn store_only_shrinks(candidates in prop::collection::vec("[a-c]{1,2}/[a-c]{1,2}", 0..40)) {
            let original = store_with(&["a/a", "a/b", "b/c", "c/ab", "ab/ca"]);
            let mut resolver = BruteForceResolver::new(original.clone());
            let resolution = resolver.resolve(&candidates);

            let remaining = resolver.into_store();
            prop_assert_eq!(remaining.len() + resolution.found.len(), original.len());
            for (dir, file, location) in remaining.iter() {
                prop_assert_eq!(original.get(dir, file), Some(location));
            }
        }
    }
}
