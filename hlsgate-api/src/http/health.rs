// Liveness check

use axum::http::StatusCode;

pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
