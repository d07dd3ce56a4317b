//! Host cost listing and fleet summary commands

use anyhow::Result;
use colored::Colorize;
use explorer_lib::{CostReport, HostReport, PricingRate, Summary};
use tabled::Tabled;

use crate::client::{ApiClient, HostQuery};
use crate::output::{
    color_usage, format_cores, format_currency, format_gb, format_percent, format_rate,
    print_info, print_json, print_table, print_warning, OutputFormat,
};

/// Row for the host cost table
#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "Host")]
    name: String,
    #[tabled(rename = "Cores")]
    cores: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "CPU %")]
    cpu_usage: String,
    #[tabled(rename = "Mem %")]
    memory_usage: String,
    #[tabled(rename = "Hourly")]
    hourly: String,
    #[tabled(rename = "Idle/h")]
    idle_hourly: String,
    #[tabled(rename = "Monthly")]
    monthly: String,
}

impl From<&HostReport> for HostRow {
    fn from(host: &HostReport) -> Self {
        Self {
            name: host.name.clone(),
            cores: format_cores(host.resource.cpu_cores),
            memory: format_gb(host.resource.memory_total_gb),
            cpu_usage: color_usage(host.usage.cpu.usage_percent()),
            memory_usage: color_usage(host.usage.memory.usage_percent),
            hourly: format_currency(host.cost.total.hourly),
            idle_hourly: format_currency(host.cost.total.idle_hourly),
            monthly: format_currency(host.cost.total.monthly),
        }
    }
}

/// Row for the per-process cost table
#[derive(Tabled)]
struct ProcessRow {
    #[tabled(rename = "Process")]
    name: String,
    #[tabled(rename = "CPU %")]
    cpu_percent: String,
    #[tabled(rename = "Cores")]
    cores: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Hourly")]
    hourly: String,
    #[tabled(rename = "Monthly")]
    monthly: String,
}

/// List hosts with their costs
pub async fn list_hosts(
    client: &ApiClient,
    query: HostQuery,
    processes: bool,
    format: OutputFormat,
) -> Result<()> {
    let report = client.hosts(&query).await?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_report(&report, processes),
    }

    Ok(())
}

fn print_report(report: &CostReport, processes: bool) {
    let page = &report.hosts;
    print_table(page.items.iter().map(HostRow::from).collect());
    println!(
        "Page {}/{} ({} hosts)",
        page.page, page.total_pages, page.total_items
    );

    if report.excluded_hosts > 0 {
        print_warning(&format!(
            "{} host(s) excluded: missing CPU core count or total memory",
            report.excluded_hosts
        ));
    }

    if processes {
        for host in &page.items {
            print_processes(host);
        }
    }

    println!();
    print_summary(&report.summary, &report.pricing);
    println!(
        "Generated at: {}",
        format_timestamp(report.generated_at).dimmed()
    );
}

fn print_processes(host: &HostReport) {
    println!();
    println!("{} {}", "Processes on".bold(), host.name.cyan());
    if host.process_costs.is_empty() {
        print_info("No process data");
        return;
    }

    let rows = host
        .process_costs
        .iter()
        .map(|p| ProcessRow {
            name: p.name.clone(),
            cpu_percent: format_percent(p.cpu_percent),
            cores: format_cores(p.cpu_cores_share),
            memory: format_gb(p.memory_gb),
            hourly: format_rate(p.total_cost_hourly),
            monthly: format_currency(p.total_cost_monthly),
        })
        .collect();
    print_table::<ProcessRow>(rows);
}

/// Show fleet totals
pub async fn show_summary(client: &ApiClient, query: HostQuery, format: OutputFormat) -> Result<()> {
    let response = client.summary(&query).await?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Table => print_summary(&response.summary, &response.pricing),
    }

    Ok(())
}

fn print_summary(summary: &Summary, pricing: &PricingRate) {
    println!("{}", "Fleet Summary".bold());
    println!("{}", "=".repeat(50));
    println!("Hosts:                  {}", summary.host_count);
    println!(
        "CPU cores:              {}",
        format_cores(summary.total_cpu_cores)
    );
    println!(
        "Memory:                 {}",
        format_gb(summary.total_memory_gb)
    );
    println!();

    println!("{}", "Costs".bold());
    println!("{}", "-".repeat(50));
    println!(
        "Hourly:                 {}",
        format_currency(summary.total_hourly)
    );
    println!(
        "Monthly:                {}",
        format_currency(summary.total_monthly).bold()
    );
    println!(
        "Used hourly:            {}",
        format_currency(summary.total_used_hourly).green()
    );
    println!(
        "Idle hourly:            {}",
        format_currency(summary.total_idle_hourly).red()
    );
    println!(
        "Utilization:            {}",
        color_usage(summary.overall_used_percent)
    );
    println!();

    let source = if pricing.is_default {
        "default rate".dimmed().to_string()
    } else {
        "custom rate".cyan().to_string()
    };
    println!(
        "Rate: {}/core/h, {}/GB/h ({})",
        format_rate(pricing.per_cpu_core),
        format_rate(pricing.per_memory_gb),
        source
    );
}

/// Format a unix timestamp for display
fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}
