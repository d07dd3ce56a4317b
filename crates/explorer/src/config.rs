//! Service configuration

use anyhow::{Context, Result};
use explorer_lib::resolver::ResolverConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "EXPLORER_CONFIG";

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerConfig {
    /// Instance name attached to structured log events
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// HTTP port for the API, health and metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Pricing rate JSON file
    #[serde(default = "default_pricing_file")]
    pub pricing_file: PathBuf,

    /// Platform JSON-RPC endpoint
    #[serde(default = "default_telemetry_url")]
    pub telemetry_url: String,

    #[serde(default)]
    pub telemetry_token: Option<String>,

    /// Serve telemetry from this fixture file instead of the platform API
    #[serde(default)]
    pub fixture_path: Option<PathBuf>,

    /// Hosts per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default)]
    pub cpu_core_keys: Vec<String>,

    #[serde(default)]
    pub memory_total_keys: Vec<String>,

    #[serde(default)]
    pub cpu_usage_keys: Vec<String>,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "cost-explorer".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_pricing_file() -> PathBuf {
    PathBuf::from("data/price.json")
}

fn default_telemetry_url() -> String {
    "http://localhost/api_jsonrpc.php".to_string()
}

fn default_page_size() -> usize {
    explorer_lib::pipeline::DEFAULT_PAGE_SIZE
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            api_port: default_api_port(),
            pricing_file: default_pricing_file(),
            telemetry_url: default_telemetry_url(),
            telemetry_token: None,
            fixture_path: None,
            page_size: default_page_size(),
            cpu_core_keys: Vec::new(),
            memory_total_keys: Vec::new(),
            cpu_usage_keys: Vec::new(),
        }
    }
}

impl ExplorerConfig {
    /// Load from `EXPLORER_*` environment variables over an optional config file
    ///
    /// The file is `$EXPLORER_CONFIG` when set, otherwise `explorer.toml` in
    /// the working directory if present.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load_from(path.as_deref())
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("explorer").required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("EXPLORER")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cpu_core_keys")
                    .with_list_parse_key("memory_total_keys")
                    .with_list_parse_key("cpu_usage_keys"),
            )
            .build()
            .context("Failed to read configuration")?;

        let mut config: ExplorerConfig = config
            .try_deserialize()
            .context("Invalid configuration")?;
        config.page_size = config.page_size.max(1);

        Ok(config)
    }

    /// Resolver key tables; unset lists keep the built-in defaults
    pub fn resolver_config(&self) -> ResolverConfig {
        let mut resolver = ResolverConfig::default();
        override_keys(&mut resolver.cpu_core_keys, &self.cpu_core_keys);
        override_keys(&mut resolver.memory_total_keys, &self.memory_total_keys);
        override_keys(&mut resolver.cpu_usage_keys, &self.cpu_usage_keys);
        resolver
    }
}

fn override_keys(target: &mut Vec<String>, configured: &[String]) {
    let keys: Vec<String> = configured
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    if !keys.is_empty() {
        *target = keys;
    }
}
