//! Error type for the dashboard's HTTP handlers.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use strava_client::StravaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Strava API error: {0}")]
    Api(#[from] StravaError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DashboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            DashboardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DashboardError::Api(_) | DashboardError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON body: `{"error": <step>, "details": <context>}`.
    pub fn body(&self) -> serde_json::Value {
        match self {
            DashboardError::Api(e) => serde_json::json!({
                "error": e.step(),
                "details": e.details(),
            }),
            DashboardError::InvalidInput(msg) => serde_json::json!({ "error": msg }),
            DashboardError::Serialization(e) => serde_json::json!({
                "error": "Failed to encode response",
                "details": e.to_string(),
            }),
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

/// Result type alias for dashboard handlers.
pub type DashboardResult<T> = Result<T, DashboardError>;
