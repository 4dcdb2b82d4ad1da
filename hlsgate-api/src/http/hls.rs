// HLS HTTP endpoints
//!
//! - GET {prefix}/<stream path>.m3u8?token=... - playlist
//! - GET {prefix}/<stream path>/<sequence>.ts  - segment
//!
//! The extension picks the endpoint and is stripped before the path reaches
//! the delivery layer.

use axum::{
    body::Body,
    extract::{ConnectInfo, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
};
use std::net::SocketAddr;
use tokio_util::io::ReaderStream;
use tracing::{debug, enabled, error, info, warn, Level};

use super::error::NOT_FOUND_BODY;
use super::{AppError, AppResult, AppState};

const PLAYLIST_EXTENSION: &str = ".m3u8";

/// First `token` value of the query, empty when absent.
///
/// The query is kept as raw pairs so repeated or unknown keys never reject a
/// request; only playlists look at the token.
fn playlist_token(params: &[(String, String)]) -> &str {
    params
        .iter()
        .find(|(key, _)| key == "token")
        .map_or("", |(_, value)| value.as_str())
}

/// Dispatch on the file extension
pub async fn handle_hls(
    Path(path): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    if let Some(stream_path) = path.strip_suffix(PLAYLIST_EXTENSION) {
        return serve_playlist(&state, stream_path, playlist_token(&params), addr).await;
    }

    let segment_path = path
        .rsplit_once('.')
        .filter(|(_, ext)| *ext == &*state.segment_extension)
        .map(|(segment_path, _)| segment_path);
    if let Some(segment_path) = segment_path {
        return serve_segment(&state, segment_path, addr).await;
    }

    warn!(path = %path, addr = %addr, "Unknown HLS resource");
    Err(AppError::not_found(NOT_FOUND_BODY))
}

/// Serve a playlist, waiting for the stream to produce one
async fn serve_playlist(
    state: &AppState,
    path: &str,
    token: &str,
    addr: SocketAddr,
) -> AppResult<Response> {
    info!(path = %path, ext = "m3u8", addr = %addr, "HLS playlist request");

    let content = state
        .delivery
        .get_playlist(path, token, &state.shutdown)
        .await
        .map_err(|e| {
            error!(path = %path, ext = "m3u8", addr = %addr, error = %e, "HLS playlist request failed");
            AppError::from(e)
        })?;

    if enabled!(Level::DEBUG) {
        debug!(path = %path, playlist = %String::from_utf8_lossy(&content), "Serving HLS playlist");
    }

    Response::builder()
        .status(StatusCode::OK)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONTENT_TYPE, "application/x-mpegURL")
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|_| AppError::internal_server_error("Failed to build response"))
}

/// Stream a segment to the client
///
/// The segment reader moves into the response body and is closed when the
/// body is dropped: after the last byte, on a write error, or when the
/// client disconnects.
async fn serve_segment(state: &AppState, path: &str, addr: SocketAddr) -> AppResult<Response> {
    info!(path = %path, ext = "ts", addr = %addr, "HLS segment request");

    let segment = state.delivery.get_segment(path).await.map_err(|e| {
        error!(path = %path, ext = "ts", addr = %addr, error = %e, "HLS segment request failed");
        AppError::from(e)
    })?;

    let length = segment.len();
    debug!(path = %path, size = length, "Serving HLS segment");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::CONTENT_TYPE, "video/mp2ts")
        .header(header::CONTENT_LENGTH, length)
        .body(Body::from_stream(ReaderStream::new(segment.into_reader())))
        .map_err(|_| AppError::internal_server_error("Failed to build response"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_playlist_token_takes_first_value() {
        assert_eq!(playlist_token(&pairs(&[("token", "a"), ("token", "b")])), "a");
        assert_eq!(playlist_token(&pairs(&[("x", "1"), ("token", "t")])), "t");
        assert_eq!(playlist_token(&pairs(&[("x", "1")])), "");
        assert_eq!(playlist_token(&[]), "");
    }
}
