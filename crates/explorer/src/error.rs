use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use explorer_lib::{PricingError, TelemetryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Pricing storage error: {0}")]
    Storage(String),
    #[error("Telemetry unavailable: {0}")]
    Telemetry(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Storage(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Telemetry(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({ "error": error_message }))).into_response()
    }
}

impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        if err.is_invalid_input() {
            ApiError::InvalidInput(format!("values must be positive numbers ({})", err))
        } else {
            ApiError::Storage(err.to_string())
        }
    }
}

impl From<TelemetryError> for ApiError {
    fn from(err: TelemetryError) -> Self {
        ApiError::Telemetry(err.detail())
    }
}
