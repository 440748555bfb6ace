//! File-backed byte source

use super::{ByteSource, SourceError, SourceResult};
use async_trait::async_trait;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, BufReader};
use tracing::trace;

/// Read buffer size for file sources
const BUFFER_SIZE: usize = 64 * 1024;

/// Byte source over a file on disk
///
/// The position is tracked locally so `position()` never touches the file.
#[derive(Debug)]
pub struct FileSource {
    reader: BufReader<File>,
    path: PathBuf,
    position: u64,
    len: u64,
}

impl FileSource {
    /// Open a file for reading
    pub async fn open(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await?;
        let len = file.metadata().await?.len();
        trace!("Opened {} ({} bytes)", path.display(), len);

        Ok(Self {
            reader: BufReader::with_capacity(BUFFER_SIZE, file),
            path,
            position: 0,
            len,
        })
    }

    /// Path the source was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File length at open time
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the file was empty at open time
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[async_trait]
impl ByteSource for FileSource {
    async fn read(&mut self, len: usize) -> SourceResult<Vec<u8>> {
        let start = self.position;
        let remaining = self.len.saturating_sub(start);
        if len as u64 > remaining {
            return Err(SourceError::TruncatedRead {
                position: start,
                requested: len,
                received: usize::try_from(remaining).unwrap_or(usize::MAX),
            });
        }

        let mut buffer = vec![0u8; len];
        let mut filled = 0;

        while filled < len {
            let n = self.reader.read(&mut buffer[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled < len {
            // File shrank after open; leave the position where the read began
            self.seek(start).await?;
            return Err(SourceError::TruncatedRead {
                position: start,
                requested: len,
                received: filled,
            });
        }

        self.position = start + len as u64;
        Ok(buffer)
    }

    async fn seek(&mut self, position: u64) -> SourceResult<()> {
        self.position = self.reader.seek(SeekFrom::Start(position)).await?;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::source::ReadPrimitives;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_read_and_seek() {
        let file = temp_file(&[0x01, 0x02, 0x03, 0x04, 0xAA, 0xBB]);
        let mut source = FileSource::open(file.path()).await.unwrap();
        assert_eq!(source.len(), 6);

        assert_eq!(source.read_u32_le().await.unwrap(), 0x0403_0201);
        assert_eq!(source.position(), 4);

        source.seek(1).await.unwrap();
        assert_eq!(source.read(2).await.unwrap(), vec![0x02, 0x03]);

        source.seek_relative(1).await.unwrap();
        assert_eq!(source.read_u16_le().await.unwrap(), 0xBBAA);
    }

    #[tokio::test]
    async fn test_truncated_read() {
        let file = temp_file(&[1, 2, 3]);
        let mut source = FileSource::open(file.path()).await.unwrap();

        let err = source.read(5).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::TruncatedRead {
                position: 0,
                requested: 5,
                received: 3
            }
        ));
        assert_eq!(source.position(), 0);
        assert_eq!(source.read(3).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_oversized_read_fails_before_allocating() {
        let file = temp_file(&[0u8; 16]);
        let mut source = FileSource::open(file.path()).await.unwrap();
        source.seek(8).await.unwrap();

        let err = source.read(usize::MAX).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::TruncatedRead {
                position: 8,
                requested: usize::MAX,
                received: 8
            }
        ));
        assert_eq!(source.position(), 8);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileSource::open(dir.path().join("missing.index")).await;
        assert!(matches!(result, Err(SourceError::Io(_))));
    }
}
