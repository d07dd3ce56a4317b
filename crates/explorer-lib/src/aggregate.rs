//! Fleet-wide totals

use crate::report::HostReport;
use crate::units::percent_of;
use serde::{Deserialize, Serialize};

/// Totals over a set of priced hosts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub host_count: usize,
    pub total_cpu_cores: f64,
    pub total_memory_gb: f64,
    pub total_used_hourly: f64,
    pub total_idle_hourly: f64,
    pub total_hourly: f64,
    pub total_monthly: f64,
    /// Used share of the total cost; 0 when the total is 0
    pub overall_used_percent: f64,
}

/// Reduce host reports to summary totals
pub fn aggregate(hosts: &[HostReport]) -> Summary {
    let mut summary = hosts.iter().fold(Summary::default(), |mut acc, host| {
        acc.host_count += 1;
        acc.total_cpu_cores += host.resource.cpu_cores;
        acc.total_memory_gb += host.resource.memory_total_gb;
        acc.total_used_hourly += host.cost.total.used_hourly;
        acc.total_idle_hourly += host.cost.total.idle_hourly;
        acc.total_hourly += host.cost.total.hourly;
        acc.total_monthly += host.cost.total.monthly;
        acc
    });

    summary.overall_used_percent = percent_of(summary.total_used_hourly, summary.total_hourly);
    summary
}
