use thiserror::Error;

/// Failures of a single HLS delivery request.
///
/// None of these are fatal to the process; each one ends exactly one request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Segment path has no separator or a non-numeric sequence
    #[error("Path illegal: {0}")]
    PathMalformed(String),

    /// No stream for the path, or the stream has no HLS output
    #[error("Stream not found: {0}")]
    StreamNotFound(String),

    /// Playlist never became ready within the wait bound; carries the provider's last error text
    #[error("Playlist unavailable: {0}")]
    PlaylistUnavailable(String),

    #[error("Segment not found: {0}")]
    SegmentNotFound(String),

    /// The server is shutting down and abandoned the wait
    #[error("Request cancelled")]
    Cancelled,
}
