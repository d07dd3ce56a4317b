//! Per-host and per-request report records handed to the presentation layer

use crate::aggregate::Summary;
use crate::cost::{CostBreakdown, ProcessCost};
use crate::pricing::PricingRate;
use crate::ranking::Page;
use crate::resolver::{ProcessSample, ResourceProfile, UsageProfile};
use serde::{Deserialize, Serialize};

/// Everything known about one priced host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostReport {
    pub host_id: String,
    pub name: String,
    pub resource: ResourceProfile,
    pub usage: UsageProfile,
    pub cost: CostBreakdown,
    /// Busiest processes by CPU, capped for display
    pub top_processes: Vec<ProcessSample>,
    /// Cost of every process on the host, most expensive first
    pub process_costs: Vec<ProcessCost>,
}

/// Result of one cost evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostReport {
    pub hosts: Page<HostReport>,
    /// Totals over every priced host, not just the returned page
    pub summary: Summary,
    pub pricing: PricingRate,
    /// Hosts dropped for lacking CPU core or total memory data
    pub excluded_hosts: usize,
    pub generated_at: i64,
}
