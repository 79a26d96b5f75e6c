//! Error types for the dashboard server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use broker_metrics::MetricsError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Errors that can occur in the dashboard server.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Too many connections.
    #[error("too many connections: {0} active, limit is {1}")]
    TooManyConnections(usize, usize),

    /// The feed task has stopped; no more snapshots are accepted.
    #[error("snapshot feed closed")]
    FeedClosed,

    /// The feed queue is full.
    #[error("snapshot feed full")]
    FeedFull,

    /// Metrics history error.
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::InvalidRequest(_) | Self::Metrics(_) => {
                (StatusCode::BAD_REQUEST, "invalid_request")
            }
            Self::TooManyConnections(_, _) => {
                (StatusCode::SERVICE_UNAVAILABLE, "too_many_connections")
            }
            Self::FeedClosed | Self::FeedFull => (StatusCode::SERVICE_UNAVAILABLE, "feed_unavailable"),
            Self::BindFailed(_, _) | Self::Internal(_) | Self::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"error":"internal_error","message":"failed to serialize error"}"#.to_string()
        });

        (status, [("content-type", "application/json")], json).into_response()
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_not_found_error_response() {
        let err = DashboardError::NotFound("snapshot".to_string());
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response.into_body();
        let bytes = body.collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["error"], "not_found");
        assert!(json["message"].as_str().unwrap().contains("snapshot"));
    }

    #[tokio::test]
    async fn test_unknown_family_is_bad_request() {
        let err = DashboardError::from(MetricsError::UnknownFamily {
            name: "latency".to_string(),
        });
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_feed_errors_are_unavailable() {
        assert_eq!(
            DashboardError::FeedClosed.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            DashboardError::FeedFull.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_too_many_connections_error_response() {
        let err = DashboardError::TooManyConnections(100, 50);
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_internal_error_response() {
        let err = DashboardError::Internal("something broke".to_string());
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_serde_error() {
        let serde_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err = DashboardError::from(serde_err);

        assert!(matches!(err, DashboardError::Serialization(_)));
    }

    #[test]
    fn test_error_display() {
        let err = DashboardError::NotFound("snapshot".to_string());
        assert_eq!(err.to_string(), "snapshot not found");

        let err = DashboardError::Metrics(MetricsError::InvalidCapacity { capacity: 0 });
        assert_eq!(err.to_string(), "invalid history capacity: 0 (must be at least 1)");
    }
}
