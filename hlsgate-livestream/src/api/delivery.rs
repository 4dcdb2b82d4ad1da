// HLS delivery API
//
// Turns a playlist or segment request into provider calls:
// - Playlist: lazily starts the stream, then polls the capability at a fixed
//   interval until the playlist is ready or the wait bound is reached.
// - Segment: parses `<stream path>/<sequence>`, looks up a running stream
//   (never starts one) and hands back a scoped byte stream.

use bytes::Bytes;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::DeliveryError;
use crate::resolver::{ResolveMode, StreamResolver};
use crate::segment::SegmentStream;

/// Fixed pause between playlist attempts
pub const PLAYLIST_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Playlist attempts allowed for a fragment duration: enough to cover the
/// first three fragments with 50% headroom, and never less than one.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn max_playlist_attempts(fragment_duration_seconds: f64) -> u32 {
    // `as` saturates and maps NaN to 0
    let attempts = (1.5 * 3.0 * fragment_duration_seconds).round() as u32;
    attempts.max(1)
}

/// Split a segment path into its stream path and sequence number.
///
/// The sequence is the text after the last `/` and must be plain ASCII
/// digits: no sign, no fraction, no whitespace.
pub fn split_segment_path(path: &str) -> Result<(&str, u64), DeliveryError> {
    let malformed = || DeliveryError::PathMalformed(path.to_string());

    let (stream_path, sequence_text) = path.rsplit_once('/').ok_or_else(malformed)?;
    if sequence_text.is_empty() || !sequence_text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let sequence = sequence_text.parse::<u64>().map_err(|_| malformed())?;

    Ok((stream_path, sequence))
}

/// Playlist and segment delivery over a stream resolver
#[derive(Clone)]
pub struct HlsDeliveryApi {
    resolver: StreamResolver,
    max_attempts: u32,
}

impl HlsDeliveryApi {
    pub fn new(resolver: StreamResolver, fragment_duration_seconds: f64) -> Self {
        Self {
            resolver,
            max_attempts: max_playlist_attempts(fragment_duration_seconds),
        }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fetch the playlist for `path`, starting the stream if needed.
    ///
    /// Playlist generation runs asynchronously in the media pipeline, so a
    /// failed query is retried every [`PLAYLIST_POLL_INTERVAL`] up to the
    /// attempt bound. The wait ends early with [`DeliveryError::Cancelled`]
    /// when `cancel` fires; dropping the returned future (client gone) stops
    /// it at the next await point.
    pub async fn get_playlist(
        &self,
        path: &str,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<Bytes, DeliveryError> {
        let capability = self
            .resolver
            .resolve(path, ResolveMode::Create)
            .await
            .ok_or_else(|| DeliveryError::StreamNotFound(path.to_string()))?;

        let mut last_error = None;
        for attempt in 1..=self.max_attempts {
            match capability.playlist(token).await {
                Ok(content) => {
                    if attempt > 1 {
                        debug!(path = %path, attempt, "Playlist ready after waiting");
                    }
                    return Ok(content);
                }
                Err(e) => {
                    debug!(
                        path = %path,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Playlist not ready"
                    );
                    last_error = Some(e);
                }
            }

            if attempt < self.max_attempts {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        warn!(path = %path, attempt, "Playlist wait cancelled");
                        return Err(DeliveryError::Cancelled);
                    }
                    () = tokio::time::sleep(PLAYLIST_POLL_INTERVAL) => {}
                }
            }
        }

        let message = last_error.map_or_else(|| "playlist unavailable".to_string(), |e| e.to_string());
        Err(DeliveryError::PlaylistUnavailable(message))
    }

    /// Open segment `<stream path>/<sequence>` of a running stream.
    ///
    /// A malformed path fails before the provider is contacted. Segment
    /// requests never start a stream.
    pub async fn get_segment(&self, path: &str) -> Result<SegmentStream, DeliveryError> {
        let (stream_path, sequence) = split_segment_path(path)?;

        let capability = self
            .resolver
            .resolve(stream_path, ResolveMode::Lookup)
            .await
            .ok_or_else(|| DeliveryError::StreamNotFound(stream_path.to_string()))?;

        capability.segment(sequence).await.map_err(|e| {
            debug!(path = %path, sequence, error = %e, "Segment lookup failed");
            DeliveryError::SegmentNotFound(path.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_playlist_attempts() {
        assert_eq!(max_playlist_attempts(10.0), 45);
        assert_eq!(max_playlist_attempts(7.0), 32);
        assert_eq!(max_playlist_attempts(2.0), 9);
        assert_eq!(max_playlist_attempts(0.1), 1);
        assert_eq!(max_playlist_attempts(0.0), 1);
        assert_eq!(max_playlist_attempts(f64::NAN), 1);
    }

    #[test]
    fn test_split_segment_path() {
        assert_eq!(split_segment_path("live/cam/12").unwrap(), ("live/cam", 12));
        assert_eq!(split_segment_path("cam/0").unwrap(), ("cam", 0));
        assert_eq!(split_segment_path("/7").unwrap(), ("", 7));
    }

    #[test]
    fn test_split_segment_path_rejects_bad_sequences() {
        for path in [
            "mystream",
            "cam/abc",
            "cam/",
            "cam/12.5",
            "cam/-3",
            "cam/+3",
            "cam/ 3",
            "cam/99999999999999999999999",
        ] {
            assert_eq!(
                split_segment_path(path),
                Err(DeliveryError::PathMalformed(path.to_string())),
                "{path:?}"
            );
        }
    }
}
