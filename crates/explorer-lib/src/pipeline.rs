//! Request pipeline: telemetry in, priced and ranked hosts out
//!
//! Every evaluation reads the current pricing rate, lists the filtered
//! hosts, resolves each host's capacity and usage from its latest samples,
//! prices the survivors, sorts them, totals them and cuts the requested page.
//! Nothing is cached between requests.

use crate::aggregate::{aggregate, Summary};
use crate::cost::compute_cost;
use crate::error::{PricingError, TelemetryError};
use crate::models::{Host, HostFilter};
use crate::observability::{ExplorerMetrics, StructuredLogger};
use crate::pricing::{PricingRate, PricingStore, RateInput, RateUpdate};
use crate::ranking::{paginate, sort_hosts, SortOrder};
use crate::report::{CostReport, HostReport};
use crate::resolver::{top_processes, HostSnapshot, MetricResolver};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::telemetry::TelemetryProvider;

/// Default sort field
pub const DEFAULT_SORT_FIELD: &str = "name";

/// Default number of hosts per page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// What to evaluate and how to present it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub filter: HostFilter,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_sort() -> String {
    DEFAULT_SORT_FIELD.to_string()
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for ReportQuery {
    fn default() -> Self {
        Self {
            filter: HostFilter::default(),
            sort: default_sort(),
            order: SortOrder::default(),
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

/// Outcome of evaluating a single host
#[derive(Debug)]
pub enum HostOutcome {
    Priced(Box<HostReport>),
    /// Host has no CPU core or total memory data
    MissingCapacity,
}

/// The cost evaluation engine
pub struct CostExplorer {
    telemetry: Arc<dyn TelemetryProvider>,
    pricing: Arc<dyn PricingStore>,
    resolver: MetricResolver,
    metrics: ExplorerMetrics,
    logger: StructuredLogger,
}

impl CostExplorer {
    pub fn new(
        telemetry: Arc<dyn TelemetryProvider>,
        pricing: Arc<dyn PricingStore>,
        resolver: MetricResolver,
    ) -> Self {
        Self {
            telemetry,
            pricing,
            resolver,
            metrics: ExplorerMetrics::new(),
            logger: StructuredLogger::new("cost-explorer"),
        }
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn telemetry(&self) -> &Arc<dyn TelemetryProvider> {
        &self.telemetry
    }

    pub fn resolver(&self) -> &MetricResolver {
        &self.resolver
    }

    /// Current pricing rate
    pub fn pricing(&self) -> PricingRate {
        self.pricing.read()
    }

    /// Validate and store a new pricing rate
    ///
    /// A rejected update leaves the previous rate in effect.
    pub fn update_pricing(
        &self,
        per_cpu_core: &RateInput,
        per_memory_gb: &RateInput,
        updated_by: &str,
    ) -> Result<PricingRate, PricingError> {
        let result = RateUpdate::parse(per_cpu_core, per_memory_gb)
            .and_then(|update| self.pricing.write(&update, updated_by));

        match &result {
            Ok(rate) => {
                self.metrics.inc_pricing_updates();
                self.logger
                    .log_pricing_update(rate.per_cpu_core, rate.per_memory_gb, updated_by);
            }
            Err(e) => {
                self.metrics.inc_pricing_update_failures();
                self.logger.log_pricing_rejected(updated_by, &e.to_string());
            }
        }

        result
    }

    /// Build a full cost report
    pub async fn evaluate(&self, query: &ReportQuery) -> Result<CostReport, TelemetryError> {
        let started = Instant::now();
        let rate = self.pricing.read();

        let hosts = self
            .telemetry
            .list_hosts(&query.filter)
            .await
            .map_err(|e| self.telemetry_failed("host.get", e))?;

        let mut reports = Vec::with_capacity(hosts.len());
        let mut evaluated = 0;
        let mut excluded = 0;

        for host in hosts.iter().filter(|h| h.has_agent_interface) {
            evaluated += 1;
            match self.evaluate_host(host, &rate).await {
                Ok(HostOutcome::Priced(report)) => reports.push(*report),
                Ok(HostOutcome::MissingCapacity) => {
                    excluded += 1;
                    self.logger
                        .log_host_excluded(&host.host_id, &host.name, "missing CPU cores or total memory");
                }
                Err(e) => {
                    excluded += 1;
                    let e = self.telemetry_failed("item.get", e);
                    self.logger
                        .log_host_excluded(&host.host_id, &host.name, &e.detail());
                }
            }
        }

        sort_hosts(&mut reports, &query.sort, query.order);
        let summary = aggregate(&reports);
        let page = paginate(&reports, query.page, query.page_size);

        let elapsed = started.elapsed();
        self.metrics
            .observe_report(elapsed.as_secs_f64(), evaluated, excluded, summary.total_hourly);
        self.logger.log_report(
            evaluated,
            reports.len(),
            excluded,
            summary.total_hourly,
            elapsed.as_millis(),
        );

        Ok(CostReport {
            hosts: page,
            summary,
            pricing: rate,
            excluded_hosts: excluded,
            generated_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Fleet totals for a filter, without the host listing
    pub async fn summarize(&self, filter: &HostFilter) -> Result<(Summary, PricingRate), TelemetryError> {
        let query = ReportQuery {
            filter: filter.clone(),
            ..ReportQuery::default()
        };
        let report = self.evaluate(&query).await?;
        Ok((report.summary, report.pricing))
    }

    /// Resolve and price one host at the given rate
    pub async fn evaluate_host(
        &self,
        host: &Host,
        rate: &PricingRate,
    ) -> Result<HostOutcome, TelemetryError> {
        let items = self.telemetry.list_host_items(&host.host_id).await?;
        let item_ids: Vec<String> = items.iter().map(|i| i.item_id.clone()).collect();
        let samples = self.telemetry.latest_values(&item_ids).await?;

        debug!(
            host_id = %host.host_id,
            items = items.len(),
            samples = samples.len(),
            "Fetched host telemetry"
        );

        let snapshot = HostSnapshot::new(items, samples);
        let resolution = self.resolver.resolve(&snapshot);

        let Some(resource) = resolution.resource else {
            return Ok(HostOutcome::MissingCapacity);
        };

        let (cost, process_costs) =
            compute_cost(&resource, &resolution.usage, &resolution.processes, rate);
        let top = top_processes(
            &resolution.processes,
            self.resolver.config().process_listing_limit,
        );

        Ok(HostOutcome::Priced(Box::new(HostReport {
            host_id: host.host_id.clone(),
            name: host.name.clone(),
            resource,
            usage: resolution.usage,
            cost,
            top_processes: top,
            process_costs,
        })))
    }

    fn telemetry_failed(&self, operation: &str, error: TelemetryError) -> TelemetryError {
        self.metrics.inc_telemetry_errors();
        self.logger.log_telemetry_error(operation, &error.detail());
        error
    }
}
