//! Cost Explorer CLI
//!
//! A command-line tool for listing host costs, viewing fleet totals
//! and managing the pricing rate of a cost explorer server.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use client::HostQuery;
use commands::{hosts, pricing, settings};
use output::OutputFormat;

/// Cost Explorer CLI
#[derive(Parser)]
#[command(name = "cex")]
#[command(author, version, about = "CLI for Cost Explorer", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via CEX_API_URL env var or `cex config set-url`)
    #[arg(long, env = "CEX_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List hosts with their costs
    Hosts {
        #[command(flatten)]
        filter: FilterArgs,

        /// Sort field
        #[arg(long, default_value = "name", value_parser = [
            "name", "cpu_cores", "memory_gb", "cpu_cost", "memory_cost", "total_cost",
        ])]
        sort: String,

        /// Sort direction
        #[arg(long, default_value = "asc")]
        order: Order,

        /// Page number (1-based)
        #[arg(long, short)]
        page: Option<usize>,

        /// Also show per-process costs for each listed host
        #[arg(long)]
        processes: bool,
    },

    /// Show fleet cost totals
    Summary {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// View or change the pricing rate
    #[command(subcommand)]
    Pricing(PricingCommands),

    /// Manage local CLI configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Host selection shared by `hosts` and `summary`
#[derive(clap::Args)]
pub struct FilterArgs {
    /// Only hosts whose name contains this text
    #[arg(long, short)]
    pub name: Option<String>,

    /// Only hosts in these host groups (repeatable or comma-separated)
    #[arg(long, short, value_delimiter = ',')]
    pub group: Vec<String>,

    /// Include hosts that are not monitored
    #[arg(long)]
    pub show_inactive: bool,
}

impl FilterArgs {
    fn into_query(self) -> HostQuery {
        HostQuery {
            name: self.name,
            group_ids: self.group,
            show_inactive: self.show_inactive,
            ..HostQuery::default()
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Subcommand)]
pub enum PricingCommands {
    /// Show the current rate
    Show,

    /// Store a new rate
    Set {
        /// Price per CPU core per hour
        #[arg(long)]
        cpu: f64,

        /// Price per GB of memory per hour
        #[arg(long)]
        memory: f64,

        /// Name recorded with the change
        #[arg(long)]
        updated_by: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the stored configuration
    Show,

    /// Store the API URL
    SetUrl {
        /// Explorer API URL, e.g. http://explorer:8080
        url: String,
    },

    /// Store the default output format
    SetFormat {
        /// Format used when --format is not given
        value: OutputFormat,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    if let Err(e) = run(cli).await {
        if verbose {
            output::print_error(&format!("{:?}", e));
        } else {
            output::print_error(&format!("{:#}", e));
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let stored = config::Config::load()?;
    let format = cli
        .format
        .or_else(|| {
            stored
                .default_format
                .as_deref()
                .and_then(OutputFormat::from_name)
        })
        .unwrap_or_default();

    let api_url = stored.resolve_api_url(cli.api_url.as_deref());
    if cli.verbose {
        output::print_info(&format!("Using API at {}", api_url));
    }

    // Local configuration commands never reach the server
    let command = match cli.command {
        Commands::Config(config_cmd) => {
            return match config_cmd {
                ConfigCommands::Show => settings::show_config(format),
                ConfigCommands::SetUrl { url } => settings::set_api_url(&url),
                ConfigCommands::SetFormat { value } => settings::set_format(value),
            };
        }
        command => command,
    };

    let client = client::ApiClient::new(&api_url)?;

    match command {
        Commands::Hosts {
            filter,
            sort,
            order,
            page,
            processes,
        } => {
            let query = HostQuery {
                sort: Some(sort),
                descending: matches!(order, Order::Desc),
                page,
                ..filter.into_query()
            };
            hosts::list_hosts(&client, query, processes, format).await?;
        }
        Commands::Summary { filter } => {
            hosts::show_summary(&client, filter.into_query(), format).await?;
        }
        Commands::Pricing(pricing_cmd) => match pricing_cmd {
            PricingCommands::Show => {
                pricing::show_pricing(&client, format).await?;
            }
            PricingCommands::Set {
                cpu,
                memory,
                updated_by,
            } => {
                pricing::set_pricing(&client, cpu, memory, updated_by, format).await?;
            }
        },
        Commands::Config(_) => {}
    }

    Ok(())
}
