// HTTP error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hlsgate_livestream::DeliveryError;
use std::fmt;

/// Plain-text body for every "not found" outcome
pub const NOT_FOUND_BODY: &str = "404 page not found";

/// Result type for HTTP handlers
pub type AppResult<T> = Result<T, AppError>;

/// Application error with HTTP status code
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for AppError {}

/// Errors go out as plain text; HLS players only look at the status.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

/// Convert delivery failures to HTTP errors
impl From<DeliveryError> for AppError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::PathMalformed(_) => Self::bad_request("Path illegal"),
            DeliveryError::StreamNotFound(_) | DeliveryError::SegmentNotFound(_) => {
                Self::not_found(NOT_FOUND_BODY)
            }
            // Provider text is passed through verbatim
            DeliveryError::PlaylistUnavailable(message) => Self::bad_request(message),
            DeliveryError::Cancelled => Self::service_unavailable("Server shutting down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_error_mapping() {
        let cases = [
            (DeliveryError::PathMalformed("x".into()), StatusCode::BAD_REQUEST, "Path illegal"),
            (DeliveryError::StreamNotFound("x".into()), StatusCode::NOT_FOUND, NOT_FOUND_BODY),
            (DeliveryError::SegmentNotFound("x/1".into()), StatusCode::NOT_FOUND, NOT_FOUND_BODY),
            (
                DeliveryError::PlaylistUnavailable("encoder offline".into()),
                StatusCode::BAD_REQUEST,
                "encoder offline",
            ),
            (DeliveryError::Cancelled, StatusCode::SERVICE_UNAVAILABLE, "Server shutting down"),
        ];

        for (err, status, message) in cases {
            let app_err = AppError::from(err);
            assert_eq!(app_err.status, status);
            assert_eq!(app_err.message, message);
        }
    }

    #[test]
    fn test_into_response_keeps_status() {
        let response = AppError::not_found(NOT_FOUND_BODY).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
