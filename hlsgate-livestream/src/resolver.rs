use std::sync::Arc;
use tracing::debug;

use crate::provider::{HlsCapability, StreamProvider};

/// How a request may touch the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Start the stream if it is not running (playlist requests)
    Create,
    /// Only find a running stream (segment requests)
    Lookup,
}

/// Resolves request paths to HLS capabilities
#[derive(Clone)]
pub struct StreamResolver {
    provider: Arc<dyn StreamProvider>,
}

impl StreamResolver {
    pub fn new(provider: Arc<dyn StreamProvider>) -> Self {
        Self { provider }
    }

    /// Returns `None` both when there is no stream and when the stream has no HLS output.
    pub async fn resolve(&self, path: &str, mode: ResolveMode) -> Option<Arc<dyn HlsCapability>> {
        let stream = match mode {
            ResolveMode::Create => self.provider.resolve_or_create(path).await,
            ResolveMode::Lookup => self.provider.resolve_only(path).await,
        };

        let Some(stream) = stream else {
            debug!(path = %path, mode = ?mode, "No stream for path");
            return None;
        };

        let hls = stream.hls();
        if hls.is_none() {
            debug!(path = %path, "Stream has no HLS output");
        }
        hls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockHls, MockStream, MockStreamProvider};

    #[tokio::test]
    async fn test_create_mode_starts_lazy_stream() {
        let provider = Arc::new(MockStreamProvider::new());
        provider.insert_lazy(MockStream::with_hls("live/a", MockHls::new()));
        let resolver = StreamResolver::new(provider.clone());

        assert!(resolver.resolve("live/a", ResolveMode::Lookup).await.is_none());
        assert!(!provider.is_running("live/a"));

        assert!(resolver.resolve("live/a", ResolveMode::Create).await.is_some());
        assert!(provider.is_running("live/a"));
        assert!(resolver.resolve("live/a", ResolveMode::Lookup).await.is_some());

        assert_eq!(provider.create_calls(), 1);
        assert_eq!(provider.lookup_calls(), 2);
    }

    #[tokio::test]
    async fn test_stream_without_hls_resolves_to_none() {
        let provider = Arc::new(MockStreamProvider::new());
        provider.insert(MockStream::without_hls("live/audio-only"));
        let resolver = StreamResolver::new(provider);

        assert!(resolver.resolve("live/audio-only", ResolveMode::Create).await.is_none());
        assert!(resolver.resolve("live/audio-only", ResolveMode::Lookup).await.is_none());
    }

    #[tokio::test]
    async fn test_paths_are_case_sensitive() {
        let provider = Arc::new(MockStreamProvider::new());
        provider.insert(MockStream::with_hls("Live/Cam", MockHls::new()));
        let resolver = StreamResolver::new(provider);

        assert!(resolver.resolve("Live/Cam", ResolveMode::Lookup).await.is_some());
        assert!(resolver.resolve("live/cam", ResolveMode::Lookup).await.is_none());
    }
}
