use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors the relay reports back to the frontend.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid JSON body")]
    MalformedPayload,

    #[error("Missing email or code")]
    MissingFields,

    #[error("Email provider returned status {status}")]
    Provider {
        status: u16,
        detail: serde_json::Value,
    },

    #[error("Failed to reach email provider: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::MalformedPayload => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid JSON" })),
            )
                .into_response(),
            RelayError::MissingFields => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing email or code" })),
            )
                .into_response(),
            RelayError::Provider { detail, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Email provider error", "detail": detail })),
            )
                .into_response(),
            RelayError::Upstream(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to send email" })),
            )
                .into_response(),
        }
    }
}
