// Mock stream provider for testing without a media pipeline
//
// Counts every call so tests can assert that a request never reached the
// provider, and hands out segment readers that count opens and closes.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

use super::{HlsCapability, LiveStream, StreamProvider};
use crate::segment::SegmentStream;

/// Mock provider
///
/// Streams added with [`MockStreamProvider::insert`] are running already.
/// Streams added with [`MockStreamProvider::insert_lazy`] only start on the
/// first `resolve_or_create` for their path.
#[derive(Default)]
pub struct MockStreamProvider {
    running: Mutex<HashMap<String, Arc<MockStream>>>,
    startable: Mutex<HashMap<String, Arc<MockStream>>>,
    create_calls: AtomicUsize,
    lookup_calls: AtomicUsize,
}

impl MockStreamProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, stream: MockStream) -> Arc<MockStream> {
        let stream = Arc::new(stream);
        self.running
            .lock()
            .insert(stream.path.clone(), Arc::clone(&stream));
        stream
    }

    pub fn insert_lazy(&self, stream: MockStream) -> Arc<MockStream> {
        let stream = Arc::new(stream);
        self.startable
            .lock()
            .insert(stream.path.clone(), Arc::clone(&stream));
        stream
    }

    #[must_use]
    pub fn is_running(&self, path: &str) -> bool {
        self.running.lock().contains_key(path)
    }

    /// Number of `resolve_or_create` calls
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of `resolve_only` calls
    #[must_use]
    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.create_calls() + self.lookup_calls()
    }
}

#[async_trait]
impl StreamProvider for MockStreamProvider {
    async fn resolve_or_create(&self, path: &str) -> Option<Arc<dyn LiveStream>> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut running = self.running.lock();
        if let Some(stream) = running.get(path) {
            return Some(Arc::clone(stream) as Arc<dyn LiveStream>);
        }
        let stream = self.startable.lock().remove(path)?;
        running.insert(path.to_string(), Arc::clone(&stream));
        Some(stream as Arc<dyn LiveStream>)
    }

    async fn resolve_only(&self, path: &str) -> Option<Arc<dyn LiveStream>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.running
            .lock()
            .get(path)
            .map(|stream| Arc::clone(stream) as Arc<dyn LiveStream>)
    }
}

/// Mock stream with or without HLS output
pub struct MockStream {
    path: String,
    hls: Option<Arc<MockHls>>,
}

impl MockStream {
    pub fn with_hls(path: impl Into<String>, hls: MockHls) -> Self {
        Self {
            path: path.into(),
            hls: Some(Arc::new(hls)),
        }
    }

    pub fn without_hls(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            hls: None,
        }
    }

    /// The mock capability, for inspecting its counters
    #[must_use]
    pub fn mock_hls(&self) -> Option<&Arc<MockHls>> {
        self.hls.as_ref()
    }
}

impl LiveStream for MockStream {
    fn path(&self) -> &str {
        &self.path
    }

    fn hls(&self) -> Option<Arc<dyn HlsCapability>> {
        self.hls
            .as_ref()
            .map(|hls| Arc::clone(hls) as Arc<dyn HlsCapability>)
    }
}

/// Mock HLS capability
///
/// The playlist becomes ready on the configured attempt; before that every
/// call fails with `playlist not ready (attempt N)`.
#[derive(Default)]
pub struct MockHls {
    playlist: Bytes,
    ready_on_attempt: Option<usize>,
    segments: HashMap<u64, Bytes>,
    playlist_calls: AtomicUsize,
    segment_calls: AtomicUsize,
    tokens: Mutex<Vec<String>>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl MockHls {
    /// Capability whose playlist is never ready
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `playlist` from attempt `attempt` (1-based) onwards
    #[must_use]
    pub fn with_playlist(mut self, playlist: impl Into<Bytes>, attempt: usize) -> Self {
        self.playlist = playlist.into();
        self.ready_on_attempt = Some(attempt);
        self
    }

    #[must_use]
    pub fn with_segment(mut self, sequence: u64, data: impl Into<Bytes>) -> Self {
        self.segments.insert(sequence, data.into());
        self
    }

    #[must_use]
    pub fn playlist_calls(&self) -> usize {
        self.playlist_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn segment_calls(&self) -> usize {
        self.segment_calls.load(Ordering::SeqCst)
    }

    /// Tokens passed to `playlist`, in call order
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().clone()
    }

    /// Segment readers handed out
    #[must_use]
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Segment readers dropped
    #[must_use]
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HlsCapability for MockHls {
    async fn playlist(&self, token: &str) -> anyhow::Result<Bytes> {
        let attempt = self.playlist_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.tokens.lock().push(token.to_string());
        match self.ready_on_attempt {
            Some(ready) if attempt >= ready => Ok(self.playlist.clone()),
            _ => Err(anyhow::anyhow!("playlist not ready (attempt {attempt})")),
        }
    }

    async fn segment(&self, sequence: u64) -> anyhow::Result<SegmentStream> {
        self.segment_calls.fetch_add(1, Ordering::SeqCst);
        let data = self
            .segments
            .get(&sequence)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("segment {sequence} not found"))?;

        self.opened.fetch_add(1, Ordering::SeqCst);
        let length = data.len() as u64;
        let reader = CountingReader {
            inner: Cursor::new(data),
            closed: Arc::clone(&self.closed),
        };
        Ok(SegmentStream::new(reader, length))
    }
}

/// Reader that records its own drop
struct CountingReader {
    inner: Cursor<Bytes>,
    closed: Arc<AtomicUsize>,
}

impl AsyncRead for CountingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl Drop for CountingReader {
    fn drop(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}
