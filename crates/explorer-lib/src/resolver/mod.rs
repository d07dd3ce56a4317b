//! Host resource resolution from telemetry items
//!
//! Identifies which of a host's items carry CPU core count, total memory,
//! CPU utilization, memory utilization and per-process CPU/memory. Every
//! lookup walks an ordered list of strategies and stops at the first item
//! whose latest sample is usable; data-quality problems never surface as
//! errors, they only make a strategy fall through.

mod capacity;
mod process;
mod usage;

#[cfg(test)]
mod tests;

pub use capacity::ResourceProfile;
pub use process::{extract_process_name, top_processes, ProcessSample};
pub use usage::{CpuMetricKind, CpuUsage, CpuUsageSource, MemoryReadings, MemoryUsage, UsageProfile};

use crate::models::{ItemSample, MonitoredItem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default exact keys for the CPU core count, in priority order
pub const DEFAULT_CPU_CORE_KEYS: &[&str] = &[
    "system.cpu.num",
    "system.cpu.num[]",
    "system.hw.cpu[,num]",
    "hw.cpu.num",
];

/// Default exact keys for total memory (bytes), in priority order
pub const DEFAULT_MEMORY_TOTAL_KEYS: &[&str] = &[
    "vm.memory.size[total]",
    "system.hw.memory[total]",
    "vm.memory.total",
    "system.memory.total",
];

/// Default CPU utilization keys, in priority order
pub const DEFAULT_CPU_USAGE_KEYS: &[&str] = &["system.cpu.util"];

/// Number of processes kept in a host's process listing
pub const DEFAULT_PROCESS_LISTING_LIMIT: usize = 10;

/// Key tables used by the resolver
///
/// Operators can extend these without touching the matching code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_cpu_core_keys")]
    pub cpu_core_keys: Vec<String>,
    #[serde(default = "default_memory_total_keys")]
    pub memory_total_keys: Vec<String>,
    #[serde(default = "default_cpu_usage_keys")]
    pub cpu_usage_keys: Vec<String>,
    #[serde(default = "default_process_listing_limit")]
    pub process_listing_limit: usize,
}

fn to_owned_keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

fn default_cpu_core_keys() -> Vec<String> {
    to_owned_keys(DEFAULT_CPU_CORE_KEYS)
}

fn default_memory_total_keys() -> Vec<String> {
    to_owned_keys(DEFAULT_MEMORY_TOTAL_KEYS)
}

fn default_cpu_usage_keys() -> Vec<String> {
    to_owned_keys(DEFAULT_CPU_USAGE_KEYS)
}

fn default_process_listing_limit() -> usize {
    DEFAULT_PROCESS_LISTING_LIMIT
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cpu_core_keys: default_cpu_core_keys(),
            memory_total_keys: default_memory_total_keys(),
            cpu_usage_keys: default_cpu_usage_keys(),
            process_listing_limit: default_process_listing_limit(),
        }
    }
}

/// Matching strategy that produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Key equals one of the configured keys
    ExactKey,
    /// Key prefix/substring or display-name heuristic
    PartialKey,
    /// Broad fallback over utilization-like keys and names
    Generic,
}

/// A metric value together with where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMetric {
    /// Raw sample value, before unit conversion
    pub value: f64,
    pub strategy: Strategy,
    pub item_key: String,
    pub item_name: String,
}

/// Outcome of a lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedMetric),
    Unresolved,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn into_option(self) -> Option<ResolvedMetric> {
        match self {
            Resolution::Resolved(metric) => Some(metric),
            Resolution::Unresolved => None,
        }
    }
}

/// One step of a fallback chain: candidate items in priority order and the
/// condition a sample must meet to be accepted
pub(crate) struct Tier<'a> {
    pub strategy: Strategy,
    pub candidates: Vec<&'a MonitoredItem>,
    pub accept: fn(f64) -> bool,
}

impl<'a> Tier<'a> {
    pub fn new(strategy: Strategy, candidates: Vec<&'a MonitoredItem>) -> Self {
        Self {
            strategy,
            candidates,
            accept: accept_any,
        }
    }

    pub fn accepting(mut self, accept: fn(f64) -> bool) -> Self {
        self.accept = accept;
        self
    }
}

pub(crate) fn accept_any(_: f64) -> bool {
    true
}

pub(crate) fn accept_positive(value: f64) -> bool {
    value > 0.0
}

/// Walk the tiers in order and return the first accepted sample
pub(crate) fn resolve_tiers(snapshot: &HostSnapshot, tiers: Vec<Tier<'_>>) -> Resolution {
    for tier in tiers {
        for item in tier.candidates {
            let Some(value) = snapshot.numeric(item) else {
                continue;
            };
            if (tier.accept)(value) {
                return Resolution::Resolved(ResolvedMetric {
                    value,
                    strategy: tier.strategy,
                    item_key: item.key.clone(),
                    item_name: item.name.clone(),
                });
            }
        }
    }
    Resolution::Unresolved
}

/// Items matching configured keys exactly, in key order then item order
pub(crate) fn exact_candidates<'a>(items: &'a [MonitoredItem], keys: &[String]) -> Vec<&'a MonitoredItem> {
    keys.iter()
        .flat_map(|key| items.iter().filter(move |item| item.key == *key))
        .collect()
}

/// A host's items and their latest samples, fetched once per request
#[derive(Debug, Clone, Default)]
pub struct HostSnapshot {
    pub items: Vec<MonitoredItem>,
    pub samples: HashMap<String, ItemSample>,
}

impl HostSnapshot {
    pub fn new(items: Vec<MonitoredItem>, samples: HashMap<String, ItemSample>) -> Self {
        Self { items, samples }
    }

    pub fn sample(&self, item: &MonitoredItem) -> Option<&ItemSample> {
        self.samples.get(&item.item_id)
    }

    /// Latest value of an item as a number, `None` when missing or malformed
    pub fn numeric(&self, item: &MonitoredItem) -> Option<f64> {
        self.sample(item).and_then(ItemSample::numeric)
    }
}

/// Everything resolved for one host
#[derive(Debug, Clone)]
pub struct HostResolution {
    /// `None` when CPU cores or total memory could not be resolved
    pub resource: Option<ResourceProfile>,
    pub usage: UsageProfile,
    /// All distinct processes seen on the host
    pub processes: Vec<ProcessSample>,
}

/// Resolves host resources from telemetry using the configured key tables
#[derive(Debug, Clone, Default)]
pub struct MetricResolver {
    config: ResolverConfig,
}

impl MetricResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve capacity, usage and processes for one host
    pub fn resolve(&self, snapshot: &HostSnapshot) -> HostResolution {
        let cpu = self.resolve_cpu_cores(snapshot);
        let memory = self.resolve_memory_total(snapshot);

        let resource = match (cpu.into_option(), memory.into_option()) {
            (Some(cpu), Some(memory)) => Some(ResourceProfile::from_resolved(&cpu, &memory)),
            _ => None,
        };

        HostResolution {
            resource,
            usage: UsageProfile {
                cpu: self.resolve_cpu_usage(snapshot),
                memory: usage::resolve_memory_usage(snapshot),
            },
            processes: process::resolve_processes(snapshot),
        }
    }
}
