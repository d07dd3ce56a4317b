//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Parse a format name stored in the config file
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows as a rounded table
pub fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("{}", "No hosts found".yellow());
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a monetary amount in dollars
pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Format an hourly rate, keeping the precision rates are usually quoted in
pub fn format_rate(amount: f64) -> String {
    format!("${:.6}", amount)
}

/// Format a percentage with one decimal
pub fn format_percent(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// Format memory in GB
pub fn format_gb(gb: f64) -> String {
    format!("{:.2} GB", gb)
}

/// Format CPU cores, dropping the fraction when whole
pub fn format_cores(cores: f64) -> String {
    if cores.fract() == 0.0 {
        format!("{:.0}", cores)
    } else {
        format!("{:.2}", cores)
    }
}

/// Color a utilization percentage: low usage means money spent on idle capacity
pub fn color_usage(percent: f64) -> String {
    let formatted = format_percent(percent);
    if percent >= 60.0 {
        formatted.green().to_string()
    } else if percent >= 25.0 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}
