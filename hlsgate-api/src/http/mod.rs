// Module: http
// Router and shared state for the HLS endpoints

pub mod error;
pub mod health;
pub mod hls;

use axum::{routing::get, Router};
use hlsgate_core::Config;
use hlsgate_livestream::HlsDeliveryApi;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub delivery: Arc<HlsDeliveryApi>,
    /// Extension that marks a segment request (without the dot)
    pub segment_extension: Arc<str>,
    /// Cancelled on server shutdown; aborts in-flight playlist waits
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(delivery: HlsDeliveryApi, config: &Config, shutdown: CancellationToken) -> Self {
        Self {
            delivery: Arc::new(delivery),
            segment_extension: Arc::from(config.storage.segment_extension.as_str()),
            shutdown,
        }
    }
}

/// Create the HTTP router
///
/// - `GET /health`
/// - `GET {route_prefix}/{*path}` - `<stream>.m3u8` playlists and `<stream>/<seq>.<ext>` segments
pub fn create_router(state: AppState, route_prefix: &str) -> Router {
    let hls_route = format!("{}/{{*path}}", route_prefix.trim_end_matches('/'));

    Router::new()
        .route("/health", get(health::health_check))
        .route(&hls_route, get(hls::handle_hls))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
