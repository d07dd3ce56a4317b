//! Cost explorer HTTP service
//!
//! Serves host cost reports, fleet summaries and the pricing rate over JSON,
//! alongside health, readiness and Prometheus metrics endpoints.

pub mod api;
pub mod config;
pub mod error;
