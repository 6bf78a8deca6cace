//! API response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::SessionError, state::PanelSnapshot};

/// Form body of the set and reset actions
#[derive(Debug, Clone, Deserialize)]
pub struct SecondsForm {
    pub seconds: u64,
}

/// Status response with the full panel state
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub panel: PanelSnapshot,
    pub uptime: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error body returned when a slot action is refused
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let code = match self {
            SessionError::UnknownSlot(_) => StatusCode::NOT_FOUND,
            SessionError::SetDisabled(_) => StatusCode::CONFLICT,
            SessionError::Disconnected => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.to_string(),
            timestamp: Utc::now(),
        };
        (code, Json(body)).into_response()
    }
}
