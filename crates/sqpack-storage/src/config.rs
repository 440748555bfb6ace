//! Configuration for archive sessions

use crate::{DATA_FILE_EXTENSION, DEFAULT_EXTRACT_DIR, DEFAULT_WORK_DIR};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for one archive session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Path of the `.index` file
    pub index_path: PathBuf,

    /// Directory holding the snapshot, confirmed paths and SQL export
    pub work_dir: PathBuf,

    /// Directory extracted files are written under
    pub extract_dir: PathBuf,
}

impl ArchiveConfig {
    /// Create a configuration for the given index file with default directories
    pub fn new<P: AsRef<Path>>(index_path: P) -> Self {
        Self {
            index_path: index_path.as_ref().to_path_buf(),
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            extract_dir: PathBuf::from(DEFAULT_EXTRACT_DIR),
        }
    }

    /// Set the work directory
    #[must_use]
    pub fn with_work_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.work_dir = path.as_ref().to_path_buf();
        self
    }

    /// Set the extraction directory
    #[must_use]
    pub fn with_extract_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.extract_dir = path.as_ref().to_path_buf();
        self
    }

    /// File name of the index, e.g. `060000.win32.index`
    pub fn index_name(&self) -> String {
        self.index_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Archive identifier: the index name up to its first `.` (`060000`)
    pub fn archive_id(&self) -> String {
        let name = self.index_name();
        name.split('.').next().unwrap_or_default().to_string()
    }

    /// Companion data file read by the decoder (`<stem>.dat0`)
    pub fn data_path(&self) -> PathBuf {
        self.index_path.with_extension(DATA_FILE_EXTENSION)
    }

    /// Hash table snapshot (`<work_dir>/<index name>.json`)
    pub fn snapshot_path(&self) -> PathBuf {
        self.artifact("json")
    }

    /// Confirmed path file (`<work_dir>/<index name>.txt`)
    pub fn results_path(&self) -> PathBuf {
        self.artifact("txt")
    }

    /// SQL export (`<work_dir>/<index name>.sql`)
    pub fn sql_path(&self) -> PathBuf {
        self.artifact("sql")
    }

    fn artifact(&self, extension: &str) -> PathBuf {
        self.work_dir
            .join(format!("{}.{extension}", self.index_name()))
    }
}
