//! Access to the monitoring platform's hosts, items and latest values
//!
//! The pipeline only talks to the [`TelemetryProvider`] trait. Two providers
//! exist: [`JsonRpcTelemetry`] for a live platform API and
//! [`StaticTelemetry`] for fixture files and tests.

mod jsonrpc;
mod r#static;

pub use jsonrpc::JsonRpcTelemetry;
pub use r#static::{FixtureHost, FixtureItem, StaticTelemetry};

use crate::error::TelemetryError;
use crate::models::{Host, HostFilter, ItemSample, MonitoredItem};
use std::collections::HashMap;

pub use async_trait::async_trait;

/// Source of host inventory and telemetry
#[async_trait]
pub trait TelemetryProvider: Send + Sync {
    /// Hosts matching the filter
    async fn list_hosts(&self, filter: &HostFilter) -> Result<Vec<Host>, TelemetryError>;

    /// Active items of one host
    async fn list_host_items(&self, host_id: &str) -> Result<Vec<MonitoredItem>, TelemetryError>;

    /// Latest value of one item, `None` when the item has never reported
    async fn latest_value(&self, item_id: &str) -> Result<Option<ItemSample>, TelemetryError>;

    /// Latest values of several items keyed by item id
    ///
    /// Items without a value are absent from the map.
    async fn latest_values(
        &self,
        item_ids: &[String],
    ) -> Result<HashMap<String, ItemSample>, TelemetryError> {
        let mut samples = HashMap::with_capacity(item_ids.len());
        for item_id in item_ids {
            if let Some(sample) = self.latest_value(item_id).await? {
                samples.insert(item_id.clone(), sample);
            }
        }
        Ok(samples)
    }

    /// Cheap reachability probe used by readiness checks
    async fn ping(&self) -> Result<(), TelemetryError> {
        Ok(())
    }
}
