//! Error types surfaced to callers
//!
//! Data-quality problems in telemetry never become errors; only pricing
//! validation/persistence and telemetry transport failures do.

use std::path::PathBuf;
use thiserror::Error;

/// Pricing update failures
#[derive(Debug, Error)]
pub enum PricingError {
    /// Rejected before anything was written
    #[error("invalid {field}: {reason}")]
    InvalidRate { field: &'static str, reason: String },

    #[error("failed to create pricing directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write pricing file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize pricing: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PricingError {
    /// True when the caller sent bad input, as opposed to a storage failure
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PricingError::InvalidRate { .. })
    }
}

/// Telemetry API failures
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("telemetry API error {code}: {message}")]
    Api {
        code: i64,
        message: String,
        data: Option<String>,
    },

    #[error("unexpected telemetry response: {0}")]
    Decode(String),

    #[error("failed to read telemetry fixture {path}: {reason}")]
    Fixture { path: PathBuf, reason: String },
}

impl TelemetryError {
    /// Error detail for logging, including the API's data field when present
    pub fn detail(&self) -> String {
        match self {
            TelemetryError::Api {
                data: Some(data), ..
            } => format!("{} ({})", self, data),
            _ => self.to_string(),
        }
    }
}
