// Stream provider seam
//
// The provider owns stream lifecycle: creation, de-duplication under
// concurrent requests, and teardown. The delivery layer only borrows
// streams for the duration of one request and never locks around them.

pub mod file;
pub mod mock;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use crate::segment::SegmentStream;

pub use file::{FileLayout, FileStream, FileStreamProvider};
pub use mock::{MockHls, MockStream, MockStreamProvider};

/// Keyed registry of running streams
///
/// Implementations must be safe to call concurrently for the same path:
/// `resolve_or_create` may be invoked by many playlist requests at once and
/// must never start more than one pipeline per path.
#[async_trait]
pub trait StreamProvider: Send + Sync {
    /// Look up the stream for `path`, starting it if it is not running yet.
    ///
    /// Returns `None` when no stream exists and none can be created.
    async fn resolve_or_create(&self, path: &str) -> Option<Arc<dyn LiveStream>>;

    /// Look up an already running stream without ever creating one.
    async fn resolve_only(&self, path: &str) -> Option<Arc<dyn LiveStream>>;
}

/// A running stream
pub trait LiveStream: Send + Sync {
    fn path(&self) -> &str;

    /// HLS output of this stream, if it produces any
    fn hls(&self) -> Option<Arc<dyn HlsCapability>>;
}

/// HLS output of a stream
#[async_trait]
pub trait HlsCapability: Send + Sync {
    /// Current playlist.
    ///
    /// An error usually means "not ready yet"; callers may retry. `token` is
    /// opaque to the gateway and only interpreted by the provider.
    async fn playlist(&self, token: &str) -> anyhow::Result<Bytes>;

    /// Open the segment with the given sequence number.
    async fn segment(&self, sequence: u64) -> anyhow::Result<SegmentStream>;
}
