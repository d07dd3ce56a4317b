//! Cost explorer library
//!
//! This crate provides the core functionality for:
//! - Resolving host capacity and utilization from heterogeneous telemetry
//! - Normalizing units and metric conventions
//! - Pricing hosts and their processes, ranking and totaling them
//! - Pricing rate storage
//! - Health checks and observability

pub mod aggregate;
pub mod cost;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod pricing;
pub mod ranking;
pub mod report;
pub mod resolver;
pub mod telemetry;
pub mod units;

pub use aggregate::Summary;
pub use error::{PricingError, TelemetryError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ExplorerMetrics, StructuredLogger};
pub use pipeline::{CostExplorer, ReportQuery};
pub use pricing::{JsonFilePricingStore, MemoryPricingStore, PricingRate, PricingStore, RateInput};
pub use ranking::{Page, SortOrder};
pub use report::{CostReport, HostReport};
pub use resolver::{MetricResolver, ResolverConfig};
pub use telemetry::{JsonRpcTelemetry, StaticTelemetry, TelemetryProvider};
