// hlsgate-livestream - HLS delivery on top of a pluggable stream provider
//
// Architecture:
// - provider/  - Stream provider seam (registry, stream, HLS capability) and bundled backends
// - resolver   - Request path -> HLS capability
// - api/       - Playlist and segment delivery protocols used by the HTTP layer
// - segment    - Scoped segment byte stream

pub mod api;
pub mod error;
pub mod provider;
pub mod resolver;
pub mod segment;

pub use api::{HlsDeliveryApi, PLAYLIST_POLL_INTERVAL};
pub use error::DeliveryError;
pub use provider::{FileLayout, FileStreamProvider, HlsCapability, LiveStream, StreamProvider};
pub use resolver::{ResolveMode, StreamResolver};
pub use segment::SegmentStream;
