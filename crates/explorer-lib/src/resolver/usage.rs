//! CPU and memory utilization resolution

use super::{exact_candidates, resolve_tiers, HostSnapshot, MetricResolver, Strategy, Tier};
use crate::models::MonitoredItem;
use crate::units::{bytes_to_gb, clamp_percent, idle_to_usage, looks_like_bytes, percent_of};
use serde::{Deserialize, Serialize};

/// How a CPU utilization item reports its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuMetricKind {
    /// Percentage idle, converted to usage as `100 - idle`
    Idle,
    /// Percentage used
    Direct,
}

impl CpuMetricKind {
    /// Classify an item by its key and display name
    pub fn classify(item: &MonitoredItem) -> Self {
        if item.key.to_lowercase().contains("idle") || item.name.to_lowercase().contains("idle") {
            CpuMetricKind::Idle
        } else {
            CpuMetricKind::Direct
        }
    }
}

/// Provenance of a resolved CPU utilization value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuUsageSource {
    pub item_key: String,
    pub strategy: Strategy,
    pub kind: CpuMetricKind,
}

/// CPU utilization of a host
///
/// Idle is never sourced on its own: it is always `100 - usage_percent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuUsage {
    usage_percent: f64,
    idle_percent: f64,
    source: Option<CpuUsageSource>,
}

impl Default for CpuUsage {
    fn default() -> Self {
        Self::from_usage(0.0, None)
    }
}

impl CpuUsage {
    /// Build from a usage percentage, clamped into [0, 100]
    pub fn from_usage(usage_percent: f64, source: Option<CpuUsageSource>) -> Self {
        let usage_percent = clamp_percent(usage_percent);
        Self {
            usage_percent,
            idle_percent: 100.0 - usage_percent,
            source,
        }
    }

    /// Build from a raw sample according to the metric kind
    pub fn from_sample(value: f64, source: CpuUsageSource) -> Self {
        let usage = match source.kind {
            CpuMetricKind::Idle => idle_to_usage(value),
            CpuMetricKind::Direct => value,
        };
        Self::from_usage(usage, Some(source))
    }

    pub fn usage_percent(&self) -> f64 {
        self.usage_percent
    }

    pub fn idle_percent(&self) -> f64 {
        self.idle_percent
    }

    pub fn source(&self) -> Option<&CpuUsageSource> {
        self.source.as_ref()
    }
}

/// Raw memory signals observed on a host, before normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryReadings {
    pub total: Option<f64>,
    pub used: Option<f64>,
    pub free: Option<f64>,
}

/// Memory utilization of a host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub total_gb: f64,
    pub used_gb: f64,
    pub free_gb: f64,
    /// In [0, 100]; 0 when total memory is unknown
    pub usage_percent: f64,
    pub readings: MemoryReadings,
}

impl MemoryUsage {
    /// Derive usage from raw readings
    ///
    /// The unit is decided once from the total: above 1e9 every reading is
    /// taken as bytes, otherwise as GB.
    pub fn from_readings(readings: MemoryReadings) -> Self {
        let total = readings.total.unwrap_or(0.0);
        if total <= 0.0 {
            return Self {
                readings,
                ..Default::default()
            };
        }

        let in_bytes = looks_like_bytes(total);
        let to_gb = |raw: f64| if in_bytes { bytes_to_gb(raw) } else { raw };

        let total_gb = to_gb(total);
        let used = readings.used.filter(|v| *v > 0.0);
        let free = readings.free.filter(|v| *v > 0.0);

        let (used_gb, free_gb) = match (used, free) {
            (Some(used), _) => {
                let used_gb = to_gb(used);
                (used_gb, (total_gb - used_gb).max(0.0))
            }
            (None, Some(free)) => {
                let free_gb = to_gb(free);
                ((total_gb - free_gb).max(0.0), free_gb)
            }
            (None, None) => (0.0, 0.0),
        };

        Self {
            total_gb,
            used_gb,
            free_gb,
            usage_percent: clamp_percent(percent_of(used_gb, total_gb)),
            readings,
        }
    }
}

/// Normalized utilization of a host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageProfile {
    pub cpu: CpuUsage,
    pub memory: MemoryUsage,
}

fn strip_brackets(key: &str) -> String {
    key.replace(['[', ']'], "")
}

fn is_generic_cpu_usage(item: &MonitoredItem) -> bool {
    let name = item.name.to_lowercase();
    item.key.starts_with("system.cpu.util")
        || item.key.contains("cpu.util")
        || item.key.contains("cpu.idle")
        || item.key.contains("perf_counter")
        || (name.contains("cpu") && (name.contains("util") || name.contains("usage")))
}

impl MetricResolver {
    /// Resolve CPU utilization; unresolved hosts report 0% usage
    pub fn resolve_cpu_usage(&self, snapshot: &HostSnapshot) -> CpuUsage {
        let items = &snapshot.items;
        let keys = &self.config.cpu_usage_keys;

        let partial: Vec<&MonitoredItem> = keys
            .iter()
            .filter(|key| !key.is_empty())
            .flat_map(|key| {
                let stripped = strip_brackets(key);
                items.iter().filter(move |item| {
                    item.key.starts_with(key.as_str()) || item.key.contains(stripped.as_str())
                })
            })
            .collect();

        let resolution = resolve_tiers(
            snapshot,
            vec![
                Tier::new(Strategy::ExactKey, exact_candidates(items, keys)),
                Tier::new(Strategy::PartialKey, partial),
                Tier::new(
                    Strategy::Generic,
                    items.iter().filter(|i| is_generic_cpu_usage(i)).collect(),
                ),
            ],
        );

        let Some(metric) = resolution.into_option() else {
            return CpuUsage::default();
        };

        let kind = items
            .iter()
            .find(|item| item.key == metric.item_key && item.name == metric.item_name)
            .map(CpuMetricKind::classify)
            .unwrap_or(CpuMetricKind::Direct);

        CpuUsage::from_sample(
            metric.value,
            CpuUsageSource {
                item_key: metric.item_key,
                strategy: metric.strategy,
                kind,
            },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemorySignal {
    Total,
    Used,
    Free,
}

fn memory_signal(key: &str) -> Option<MemorySignal> {
    if key.starts_with("vm.memory.size[total]") || key.contains("memory.total") {
        Some(MemorySignal::Total)
    } else if key.starts_with("vm.memory.size[used]") || key.contains("memory.used") {
        Some(MemorySignal::Used)
    } else if key.starts_with("vm.memory.size[available]")
        || key.contains("memory.available")
        || key.contains("memory.free")
    {
        Some(MemorySignal::Free)
    } else {
        None
    }
}

/// Scan every item once; a later item overwrites an earlier one of the same signal
pub(crate) fn resolve_memory_usage(snapshot: &HostSnapshot) -> MemoryUsage {
    let mut readings = MemoryReadings::default();

    for item in &snapshot.items {
        let Some(signal) = memory_signal(&item.key) else {
            continue;
        };
        let Some(value) = snapshot.numeric(item) else {
            continue;
        };
        match signal {
            MemorySignal::Total => readings.total = Some(value),
            MemorySignal::Used => readings.used = Some(value),
            MemorySignal::Free => readings.free = Some(value),
        }
    }

    MemoryUsage::from_readings(readings)
}
