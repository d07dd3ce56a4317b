//! Pricing rate commands

use anyhow::{bail, Result};
use colored::Colorize;
use explorer_lib::PricingRate;

use crate::client::{ApiClient, PricingUpdateRequest};
use crate::output::{format_currency, format_rate, print_json, print_success, OutputFormat};

/// Show the rate currently in effect
pub async fn show_pricing(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let pricing = client.pricing().await?;

    match format {
        OutputFormat::Json => print_json(&pricing)?,
        OutputFormat::Table => print_rate(&pricing),
    }

    Ok(())
}

/// Replace the stored rate
pub async fn set_pricing(
    client: &ApiClient,
    cpu: f64,
    memory: f64,
    updated_by: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    if !(cpu.is_finite() && cpu > 0.0 && memory.is_finite() && memory > 0.0) {
        bail!("Rates must be positive numbers");
    }

    let response = client
        .update_pricing(&PricingUpdateRequest {
            per_cpu_core: cpu,
            per_memory_gb: memory,
            updated_by,
        })
        .await?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Table => {
            for message in &response.messages {
                print_success(message);
            }
        }
    }

    Ok(())
}

fn print_rate(pricing: &PricingRate) {
    println!("{}", "Pricing".bold());
    println!("{}", "=".repeat(50));
    println!("Per CPU core/hour:      {}", format_rate(pricing.per_cpu_core));
    println!("Per memory GB/hour:     {}", format_rate(pricing.per_memory_gb));
    println!(
        "Core-month / GB-month:  {} / {}",
        format_currency(explorer_lib::cost::monthly(pricing.per_cpu_core)),
        format_currency(explorer_lib::cost::monthly(pricing.per_memory_gb))
    );

    if pricing.is_default {
        println!("Source:                 {}", "built-in default".dimmed());
    } else {
        println!("Source:                 {}", "stored".cyan());
        if let Some(at) = &pricing.updated_at {
            println!("Updated at:             {}", at);
        }
        if let Some(by) = &pricing.updated_by {
            println!("Updated by:             {}", by);
        }
    }
}
