// hlsgate-api - HTTP surface of the HLS gateway

pub mod http;

pub use http::{create_router, AppError, AppResult, AppState};
