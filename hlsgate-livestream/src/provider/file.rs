// File-backed stream provider
//
// An external segmenter (ffmpeg, a remuxer, ...) writes one directory per
// stream under the storage root:
//
//   <root>/<stream path>/index.m3u8
//   <root>/<stream path>/<sequence>.ts
//
// A stream is registered the first time a playlist request finds its
// directory. Segment requests only see registered streams. A registered
// stream whose directory has since been removed is dropped on its next
// request.

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::{HlsCapability, LiveStream, StreamProvider};
use crate::segment::SegmentStream;

/// File names inside a stream directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLayout {
    pub playlist_file: String,
    pub segment_extension: String,
}

impl Default for FileLayout {
    fn default() -> Self {
        Self {
            playlist_file: "index.m3u8".to_string(),
            segment_extension: "ts".to_string(),
        }
    }
}

/// Registry of file-backed streams
pub struct FileStreamProvider {
    root: PathBuf,
    layout: FileLayout,
    streams: DashMap<String, Arc<FileStream>>,
}

impl FileStreamProvider {
    pub fn new(root: impl Into<PathBuf>, layout: FileLayout) -> Self {
        Self {
            root: root.into(),
            layout,
            streams: DashMap::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of registered streams
    #[must_use]
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Drop every registered stream. In-flight requests keep their own handles.
    pub fn clear(&self) {
        self.streams.clear();
    }

    /// Map a stream path to its directory. Anything that could escape the root is refused.
    fn stream_dir(&self, path: &str) -> Option<PathBuf> {
        let escapes = path.is_empty()
            || path
                .split('/')
                .any(|part| part.is_empty() || part == "." || part == ".." || part.contains('\\'));
        if escapes {
            return None;
        }
        Some(self.root.join(path))
    }

    /// Registered stream for `path`, unregistering it if its directory is gone.
    async fn registered(&self, path: &str) -> Option<Arc<FileStream>> {
        let stream = self.streams.get(path).map(|entry| entry.value().clone())?;
        if is_dir(&stream.hls.dir).await {
            return Some(stream);
        }

        // Only remove the entry we checked; a concurrent re-registration stays.
        let removed = self
            .streams
            .remove_if(path, |_, current| Arc::ptr_eq(current, &stream))
            .is_some();
        if removed {
            info!(path = %path, "Stream directory removed, unregistered stream");
        }
        None
    }
}

async fn is_dir(dir: &Path) -> bool {
    tokio::fs::metadata(dir)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

#[async_trait]
impl StreamProvider for FileStreamProvider {
    async fn resolve_or_create(&self, path: &str) -> Option<Arc<dyn LiveStream>> {
        if let Some(stream) = self.registered(path).await {
            return Some(stream as Arc<dyn LiveStream>);
        }

        let Some(dir) = self.stream_dir(path) else {
            debug!(path = %path, "Rejected stream path");
            return None;
        };
        if !is_dir(&dir).await {
            return None;
        }

        // Concurrent first requests race to here; the entry API keeps exactly one.
        let stream = self
            .streams
            .entry(path.to_string())
            .or_insert_with(|| {
                info!(path = %path, dir = %dir.display(), "Registered file-backed stream");
                Arc::new(FileStream::new(path, dir, self.layout.clone()))
            })
            .value()
            .clone();

        Some(stream as Arc<dyn LiveStream>)
    }

    async fn resolve_only(&self, path: &str) -> Option<Arc<dyn LiveStream>> {
        self.registered(path)
            .await
            .map(|stream| stream as Arc<dyn LiveStream>)
    }
}

/// One stream directory
pub struct FileStream {
    path: String,
    hls: Arc<FileHls>,
}

impl FileStream {
    fn new(path: &str, dir: PathBuf, layout: FileLayout) -> Self {
        Self {
            path: path.to_string(),
            hls: Arc::new(FileHls { dir, layout }),
        }
    }
}

impl LiveStream for FileStream {
    fn path(&self) -> &str {
        &self.path
    }

    fn hls(&self) -> Option<Arc<dyn HlsCapability>> {
        Some(self.hls.clone() as Arc<dyn HlsCapability>)
    }
}

struct FileHls {
    dir: PathBuf,
    layout: FileLayout,
}

#[async_trait]
impl HlsCapability for FileHls {
    // File-backed streams keep no per-viewer state, so the token is not consulted.
    async fn playlist(&self, _token: &str) -> anyhow::Result<Bytes> {
        let file = self.dir.join(&self.layout.playlist_file);
        match tokio::fs::read(&file).await {
            // Segmenters often create the file before the first write lands
            Ok(data) if data.is_empty() => Err(anyhow::anyhow!("playlist not ready")),
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(anyhow::anyhow!("playlist not ready")),
            Err(e) => Err(anyhow::anyhow!("failed to read playlist: {e}")),
        }
    }

    async fn segment(&self, sequence: u64) -> anyhow::Result<SegmentStream> {
        let file_path = self
            .dir
            .join(format!("{sequence}.{}", self.layout.segment_extension));
        let file = tokio::fs::File::open(&file_path)
            .await
            .with_context(|| format!("segment {sequence} not found"))?;
        let length = file.metadata().await?.len();
        Ok(SegmentStream::new(file, length))
    }
}
