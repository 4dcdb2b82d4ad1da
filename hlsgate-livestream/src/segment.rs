// Scoped segment byte stream
//
// A segment handed out by a provider is owned by exactly one transfer.
// The underlying reader is closed when the `SegmentStream` (or the reader
// taken out of it) is dropped, so completion, write failure and peer
// disconnect all release it the same way.

use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, Take};

/// Boxed reader a provider returns for one segment
pub type SegmentReader = Box<dyn AsyncRead + Send + Unpin>;

/// A segment's bytes paired with the length the provider declared for it
pub struct SegmentStream {
    reader: SegmentReader,
    length: u64,
}

impl SegmentStream {
    pub fn new(reader: impl AsyncRead + Send + Unpin + 'static, length: u64) -> Self {
        Self {
            reader: Box::new(reader),
            length,
        }
    }

    /// Declared byte length, known before any byte is read
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.length
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Hand the reader to a streaming response body.
    ///
    /// The reader is capped at the declared length so a body never outruns
    /// its `Content-Length`.
    #[must_use]
    pub fn into_reader(self) -> Take<SegmentReader> {
        self.reader.take(self.length)
    }

    /// Copy the whole segment into `writer`.
    ///
    /// The reader is released when this returns, whether the copy finished
    /// or the writer failed partway.
    pub async fn copy_to<W>(self, writer: &mut W) -> std::io::Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut reader = self.into_reader();
        tokio::io::copy(&mut reader, writer).await
    }
}

impl fmt::Debug for SegmentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentStream")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_copy_to_writes_declared_bytes() {
        let segment = SegmentStream::new(Cursor::new(b"0123456789".to_vec()), 10);
        assert_eq!(segment.len(), 10);

        let mut out = Vec::new();
        let copied = segment.copy_to(&mut out).await.unwrap();

        assert_eq!(copied, 10);
        assert_eq!(out, b"0123456789");
    }

    #[tokio::test]
    async fn test_reader_is_capped_at_declared_length() {
        let segment = SegmentStream::new(Cursor::new(b"0123456789".to_vec()), 4);

        let mut out = Vec::new();
        segment.into_reader().read_to_end(&mut out).await.unwrap();

        assert_eq!(out, b"0123");
    }

    #[test]
    fn test_debug_shows_length() {
        let segment = SegmentStream::new(Cursor::new(Vec::new()), 0);
        assert!(segment.is_empty());
        assert!(format!("{segment:?}").contains("length: 0"));
    }
}
