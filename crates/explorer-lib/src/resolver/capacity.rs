//! CPU core count and total memory resolution

use super::{
    accept_positive, exact_candidates, resolve_tiers, HostSnapshot, MetricResolver, Resolution,
    ResolvedMetric, Strategy, Tier,
};
use crate::models::MonitoredItem;
use crate::units::{bytes_to_gb, normalize_memory_gb, round2};
use serde::{Deserialize, Serialize};

/// Static capacity of a host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceProfile {
    pub cpu_cores: f64,
    /// Total memory in GB at full precision
    pub memory_total_gb: f64,
    /// Memory value as sampled, before normalization
    pub memory_total_raw: f64,
    pub cpu_item_key: String,
    pub memory_item_key: String,
    pub cpu_strategy: Strategy,
    pub memory_strategy: Strategy,
}

impl ResourceProfile {
    pub(crate) fn from_resolved(cpu: &ResolvedMetric, memory: &ResolvedMetric) -> Self {
        Self {
            cpu_cores: cpu.value,
            memory_total_gb: memory_total_gb(memory),
            memory_total_raw: memory.value,
            cpu_item_key: cpu.item_key.clone(),
            memory_item_key: memory.item_key.clone(),
            cpu_strategy: cpu.strategy,
            memory_strategy: memory.strategy,
        }
    }

    /// Total memory rounded for display
    pub fn memory_total_gb_display(&self) -> f64 {
        round2(self.memory_total_gb)
    }
}

/// Exact keys report bytes; heuristic matches may already be in GB
fn memory_total_gb(memory: &ResolvedMetric) -> f64 {
    match memory.strategy {
        Strategy::ExactKey => bytes_to_gb(memory.value),
        Strategy::PartialKey | Strategy::Generic => normalize_memory_gb(memory.value),
    }
}

fn is_cpu_core_like(item: &MonitoredItem) -> bool {
    item.key.starts_with("system.cpu.num")
        || item.key.contains("hw.cpu")
        || (item.key.contains("cpu") && item.name.contains("CPU") && item.name.contains("num"))
}

fn is_memory_total_like(item: &MonitoredItem) -> bool {
    item.key.starts_with("vm.memory")
        || (item.key.contains("memory") && item.key.contains("total"))
        || (item.name.contains("Memory") && item.name.contains("total"))
}

impl MetricResolver {
    /// Resolve the CPU core count
    pub fn resolve_cpu_cores(&self, snapshot: &HostSnapshot) -> Resolution {
        let items = &snapshot.items;
        resolve_tiers(
            snapshot,
            vec![
                Tier::new(
                    Strategy::ExactKey,
                    exact_candidates(items, &self.config.cpu_core_keys),
                ),
                Tier::new(
                    Strategy::PartialKey,
                    items.iter().filter(|i| is_cpu_core_like(i)).collect(),
                )
                .accepting(accept_positive),
            ],
        )
    }

    /// Resolve total memory; the resolved value is the raw sample
    pub fn resolve_memory_total(&self, snapshot: &HostSnapshot) -> Resolution {
        let items = &snapshot.items;
        resolve_tiers(
            snapshot,
            vec![
                Tier::new(
                    Strategy::ExactKey,
                    exact_candidates(items, &self.config.memory_total_keys),
                ),
                Tier::new(
                    Strategy::PartialKey,
                    items.iter().filter(|i| is_memory_total_like(i)).collect(),
                )
                .accepting(accept_positive),
            ],
        )
    }
}
