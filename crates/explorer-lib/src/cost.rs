//! Cost model
//!
//! Prices a host's capacity with the configured hourly rates and splits it
//! into the share that is in use and the share that sits idle. Monetary
//! values are plain floats; rounding belongs to presentation.

use crate::pricing::PricingRate;
use crate::resolver::{ProcessSample, ResourceProfile, UsageProfile};
use serde::{Deserialize, Serialize};

/// Hours in the fixed 30-day month used for monthly figures
pub const HOURS_PER_MONTH: f64 = 24.0 * 30.0;

/// Scale an hourly amount to a month
#[inline]
pub fn monthly(hourly: f64) -> f64 {
    hourly * HOURS_PER_MONTH
}

/// One priced resource, split into used and idle portions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub hourly: f64,
    pub used_hourly: f64,
    pub idle_hourly: f64,
    pub monthly: f64,
    pub used_monthly: f64,
    pub idle_monthly: f64,
}

impl CostLine {
    fn from_parts(hourly: f64, used_hourly: f64, idle_hourly: f64) -> Self {
        Self {
            hourly,
            used_hourly,
            idle_hourly,
            monthly: monthly(hourly),
            used_monthly: monthly(used_hourly),
            idle_monthly: monthly(idle_hourly),
        }
    }

    /// Price a capacity at `hourly` and split it by a usage percentage
    pub fn split(hourly: f64, usage_percent: f64) -> Self {
        let used_fraction = usage_percent / 100.0;
        Self::from_parts(
            hourly,
            hourly * used_fraction,
            hourly * (1.0 - used_fraction),
        )
    }

    /// Combine two lines; the total is the sum of used and idle
    pub fn combine(a: &CostLine, b: &CostLine) -> Self {
        let used_hourly = a.used_hourly + b.used_hourly;
        let idle_hourly = a.idle_hourly + b.idle_hourly;
        Self::from_parts(used_hourly + idle_hourly, used_hourly, idle_hourly)
    }
}

/// Cost of one host
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub cpu: CostLine,
    pub memory: CostLine,
    pub total: CostLine,
}

/// Cost attributed to one process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessCost {
    pub name: String,
    pub cpu_percent: f64,
    /// Share of the host's cores used by the process
    pub cpu_cores_share: f64,
    pub memory_gb: f64,
    pub cpu_cost_hourly: f64,
    pub memory_cost_hourly: f64,
    pub total_cost_hourly: f64,
    pub total_cost_monthly: f64,
}

/// Price a host's capacity and split it by utilization
pub fn compute_breakdown(
    resource: &ResourceProfile,
    usage: &UsageProfile,
    rate: &PricingRate,
) -> CostBreakdown {
    let cpu = CostLine::split(
        resource.cpu_cores * rate.per_cpu_core,
        usage.cpu.usage_percent(),
    );
    let memory = CostLine::split(
        resource.memory_total_gb * rate.per_memory_gb,
        usage.memory.usage_percent,
    );
    let total = CostLine::combine(&cpu, &memory);

    CostBreakdown { cpu, memory, total }
}

/// Price every process, most expensive first
///
/// Nothing is attributed when no process reports CPU usage.
pub fn compute_process_costs(
    resource: &ResourceProfile,
    processes: &[ProcessSample],
    rate: &PricingRate,
) -> Vec<ProcessCost> {
    let total_process_cpu: f64 = processes.iter().map(|p| p.cpu_percent).sum();
    if total_process_cpu <= 0.0 {
        return Vec::new();
    }

    let mut costs: Vec<ProcessCost> = processes
        .iter()
        .map(|process| {
            let cpu_cores_share = process.cpu_percent / 100.0 * resource.cpu_cores;
            let memory_gb = process.memory_gb(resource.memory_total_gb);
            let cpu_cost_hourly = cpu_cores_share * rate.per_cpu_core;
            let memory_cost_hourly = memory_gb * rate.per_memory_gb;
            let total_cost_hourly = cpu_cost_hourly + memory_cost_hourly;

            ProcessCost {
                name: process.name.clone(),
                cpu_percent: process.cpu_percent,
                cpu_cores_share,
                memory_gb,
                cpu_cost_hourly,
                memory_cost_hourly,
                total_cost_hourly,
                total_cost_monthly: monthly(total_cost_hourly),
            }
        })
        .collect();

    costs.sort_by(|a, b| b.total_cost_hourly.total_cmp(&a.total_cost_hourly));
    costs
}

/// Full cost computation for one host
pub fn compute_cost(
    resource: &ResourceProfile,
    usage: &UsageProfile,
    processes: &[ProcessSample],
    rate: &PricingRate,
) -> (CostBreakdown, Vec<ProcessCost>) {
    (
        compute_breakdown(resource, usage, rate),
        compute_process_costs(resource, processes, rate),
    )
}
