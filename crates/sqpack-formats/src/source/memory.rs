//! In-memory byte source

use super::{ByteSource, SourceError, SourceResult};
use async_trait::async_trait;
use bytes::Bytes;

/// Byte source over a buffer that is already in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Bytes,
    position: u64,
}

impl MemorySource {
    /// Wrap a buffer, starting at position 0
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            position: 0,
        }
    }

    /// Total length of the buffer
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the current position and the end
    pub fn remaining(&self) -> u64 {
        self.len().saturating_sub(self.position)
    }

    /// Read without suspending
    pub fn read_now(&mut self, len: usize) -> SourceResult<Vec<u8>> {
        if len == 0 {
            return Ok(Vec::new());
        }

        let start = usize::try_from(self.position).unwrap_or(usize::MAX);
        let available = self.data.len().saturating_sub(start);
        if available < len {
            return Err(SourceError::TruncatedRead {
                position: self.position,
                requested: len,
                received: available,
            });
        }

        let chunk = self.data.slice(start..start + len).to_vec();
        self.position += len as u64;
        Ok(chunk)
    }

    /// Consume the source and return the underlying buffer
    pub fn into_inner(self) -> Bytes {
        self.data
    }
}

#[async_trait]
impl ByteSource for MemorySource {
    async fn read(&mut self, len: usize) -> SourceResult<Vec<u8>> {
        self.read_now(len)
    }

    async fn seek(&mut self, position: u64) -> SourceResult<()> {
        self.position = position;
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

    #[tokio::test]
    async fn test_read_advances_position() {
        let mut source = MemorySource::new(vec![1u8, 2, 3, 4, 5]);
        assert_eq!(source.read(2).await.unwrap(), vec![1, 2]);
        assert_eq!(source.position(), 2);
        assert_eq!(source.read(3).await.unwrap(), vec![3, 4, 5]);
        assert_eq!(source.remaining(), 0);
    }

    #[tokio::test]
    async fn test_truncated_read_keeps_position() {
        let mut source = MemorySource::new(vec![0u8; 4]);
        source.seek(2).await.unwrap();

        let err = source.read(8).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::TruncatedRead {
                position: 2,
                requested: 8,
                received: 2
            }
        ));
        assert_eq!(source.position(), 2);
    }

    #[tokio::test]
    async fn test_seek_relative() {
        let mut source = MemorySource::new(vec![10u8, 20, 30, 40]);
        source.seek(3).await.unwrap();
        source.seek_relative(-2).await.unwrap();
        assert_eq!(source.read(1).await.unwrap(), vec![20]);

        let err = source.seek_relative(-10).await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidSeek { .. }));
    }

    #[tokio::test]
    async fn test_seek_past_end_then_read_fails() {
        let mut source = MemorySource::new(vec![0u8; 4]);
        source.seek(100).await.unwrap();
        assert!(source.read(1).await.is_err());
        assert!(source.read(0).await.unwrap().is_empty());
    }
}
