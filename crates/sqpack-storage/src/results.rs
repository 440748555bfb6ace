//! Confirmed path file
//!
//! One resolved path per line, deduplicated and sorted lexicographically.

use crate::Result;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Set of paths known to exist in an archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmedPaths {
    paths: BTreeSet<String>,
}

impl ConfirmedPaths {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse file contents; blank lines are ignored
    pub fn parse(contents: &str) -> Self {
        let paths = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { paths }
    }

    /// Load the file, or an empty set if it does not exist
    pub async fn load(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(Self::parse(&contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Add paths; returns how many were new
    pub fn merge<I, S>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.paths.len();
        self.paths.extend(paths.into_iter().map(Into::into));
        self.paths.len() - before
    }

    /// Whether a path is confirmed
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Number of paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Paths in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// File contents: sorted lines, each terminated by `\n`
    pub fn render(&self) -> String {
        let mut out = String::new();
        for path in &self.paths {
            out.push_str(path);
            out.push('\n');
        }
        out
    }

    /// Write the file, creating parent directories as needed
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, self.render()).await?;
        debug!("Wrote {} confirmed paths to {}", self.len(), path.display());
        Ok(())
    }
}
