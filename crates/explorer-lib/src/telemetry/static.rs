//! In-memory telemetry, optionally loaded from a JSON fixture file

use super::{async_trait, TelemetryProvider};
use crate::error::TelemetryError;
use crate::models::{Host, HostFilter, ItemSample, MonitoredItem};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

/// A host with its items, as stored in a fixture file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureHost {
    #[serde(flatten)]
    pub host: Host,
    #[serde(default)]
    pub items: Vec<FixtureItem>,
}

/// An item with its latest value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureItem {
    #[serde(flatten)]
    pub item: MonitoredItem,
    #[serde(default)]
    pub last_value: Option<String>,
    #[serde(default)]
    pub last_clock: Option<i64>,
}

impl FixtureItem {
    fn sample(&self) -> Option<ItemSample> {
        self.last_value.as_ref().map(|value| ItemSample {
            value: Some(value.clone()),
            timestamp: self.last_clock,
        })
    }
}

/// Telemetry provider serving a fixed inventory
#[derive(Debug, Clone, Default)]
pub struct StaticTelemetry {
    hosts: Vec<Host>,
    items: HashMap<String, Vec<MonitoredItem>>,
    samples: HashMap<String, ItemSample>,
    failing_hosts: HashSet<String>,
    outage: Option<String>,
}

impl StaticTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from fixture hosts
    pub fn from_fixture(hosts: Vec<FixtureHost>) -> Self {
        hosts
            .into_iter()
            .fold(Self::new(), |telemetry, fixture| {
                let items = fixture
                    .items
                    .into_iter()
                    .map(|item| {
                        let sample = item.sample();
                        (item.item, sample)
                    })
                    .collect();
                telemetry.with_host(fixture.host, items)
            })
    }

    /// Load a JSON array of fixture hosts
    pub async fn load(path: &Path) -> Result<Self, TelemetryError> {
        let fixture_err = |reason: String| TelemetryError::Fixture {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| fixture_err(e.to_string()))?;
        let hosts: Vec<FixtureHost> =
            serde_json::from_slice(&bytes).map_err(|e| fixture_err(e.to_string()))?;

        info!(path = %path.display(), hosts = hosts.len(), "Loaded telemetry fixture");

        Ok(Self::from_fixture(hosts))
    }

    /// Add a host with its items and their latest values
    pub fn with_host(mut self, host: Host, items: Vec<(MonitoredItem, Option<ItemSample>)>) -> Self {
        let mut host_items = Vec::with_capacity(items.len());
        for (item, sample) in items {
            if let Some(sample) = sample {
                self.samples.insert(item.item_id.clone(), sample);
            }
            host_items.push(item);
        }
        self.items.insert(host.host_id.clone(), host_items);
        self.hosts.push(host);
        self
    }

    /// Make item listing fail for a host
    pub fn with_failing_host(mut self, host_id: impl Into<String>) -> Self {
        self.failing_hosts.insert(host_id.into());
        self
    }

    /// Make host listing fail, as if the platform were down
    pub fn with_outage(mut self, reason: impl Into<String>) -> Self {
        self.outage = Some(reason.into());
        self
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }
}

#[async_trait]
impl TelemetryProvider for StaticTelemetry {
    async fn list_hosts(&self, filter: &HostFilter) -> Result<Vec<Host>, TelemetryError> {
        if let Some(reason) = &self.outage {
            return Err(TelemetryError::Decode(reason.clone()));
        }
        Ok(self
            .hosts
            .iter()
            .filter(|host| filter.matches(host))
            .cloned()
            .collect())
    }

    async fn list_host_items(&self, host_id: &str) -> Result<Vec<MonitoredItem>, TelemetryError> {
        if self.failing_hosts.contains(host_id) {
            return Err(TelemetryError::Api {
                code: -32500,
                message: "Application error.".to_string(),
                data: Some(format!("items of host {} unavailable", host_id)),
            });
        }
        Ok(self.items.get(host_id).cloned().unwrap_or_default())
    }

    async fn latest_value(&self, item_id: &str) -> Result<Option<ItemSample>, TelemetryError> {
        Ok(self.samples.get(item_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HostStatus, ItemStatus, ValueType};
    use tempfile::TempDir;

    const FIXTURE: &str = r#"[
        {
            "host_id": "10084",
            "name": "web-01",
            "status": "monitored",
            "has_agent_interface": true,
            "group_ids": ["2"],
            "items": [
                {
                    "item_id": "1",
                    "key": "system.cpu.num",
                    "name": "Number of CPUs",
                    "value_type": "unsigned",
                    "status": "active",
                    "last_value": "4",
                    "last_clock": 1700000000
                },
                {
                    "item_id": "2",
                    "key": "vm.memory.size[total]",
                    "name": "Total memory",
                    "value_type": "unsigned",
                    "units": "B",
                    "status": "active"
                }
            ]
        },
        {
            "host_id": "10085",
            "name": "db-01",
            "status": "unmonitored",
            "has_agent_interface": true
        }
    ]"#;

    #[tokio::test]
    async fn test_load_fixture() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fixture.json");
        std::fs::write(&path, FIXTURE).unwrap();

        let telemetry = StaticTelemetry::load(&path).await.unwrap();
        assert_eq!(telemetry.host_count(), 2);

        let hosts = telemetry.list_hosts(&HostFilter::default()).await.unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].name, "web-01");

        let items = telemetry.list_host_items("10084").await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].units, "B");

        let sample = telemetry.latest_value("1").await.unwrap().unwrap();
        assert_eq!(sample.numeric(), Some(4.0));
        assert_eq!(sample.timestamp, Some(1700000000));
        assert!(telemetry.latest_value("2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_missing_fixture_fails() {
        let dir = TempDir::new().unwrap();
        let err = StaticTelemetry::load(&dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, TelemetryError::Fixture { .. }));
    }

    #[tokio::test]
    async fn test_latest_values_skips_missing() {
        let host = Host {
            host_id: "h1".to_string(),
            name: "h1".to_string(),
            status: HostStatus::Monitored,
            has_agent_interface: true,
            group_ids: Vec::new(),
        };
        let item = |id: &str| MonitoredItem {
            item_id: id.to_string(),
            key: format!("key.{}", id),
            name: id.to_string(),
            value_type: ValueType::Float,
            units: String::new(),
            status: ItemStatus::Active,
        };
        let telemetry = StaticTelemetry::new().with_host(
            host,
            vec![(item("a"), Some(ItemSample::new("1.5", 10))), (item("b"), None)],
        );

        let values = telemetry
            .latest_values(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["a"].numeric(), Some(1.5));
    }

    #[tokio::test]
    async fn test_failing_host() {
        let telemetry = StaticTelemetry::new().with_failing_host("h1");
        assert!(telemetry.list_host_items("h1").await.is_err());
        assert!(telemetry.list_host_items("h2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_outage() {
        let telemetry = StaticTelemetry::new().with_outage("platform down");
        let err = telemetry.list_hosts(&HostFilter::default()).await.unwrap_err();
        assert!(err.to_string().contains("platform down"));
    }
}
