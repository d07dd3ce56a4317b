//! Pricing configuration
//!
//! The hourly price of one CPU core and one GB of memory. The rate is read
//! at the start of every evaluation and only changes through an explicit,
//! validated update that overwrites the previous rate.

mod file;

pub use file::JsonFilePricingStore;

use crate::error::PricingError;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

/// Default hourly price per CPU core
pub const DEFAULT_PER_CPU_CORE: f64 = 0.03465;

/// Default hourly price per GB of memory
pub const DEFAULT_PER_MEMORY_GB: f64 = 0.003938;

/// Format of `updated_at`
pub const UPDATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Hourly pricing rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRate {
    pub per_cpu_core: f64,
    pub per_memory_gb: f64,
    /// True when no rate has been stored yet
    #[serde(rename = "default", default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl Default for PricingRate {
    fn default() -> Self {
        Self {
            per_cpu_core: DEFAULT_PER_CPU_CORE,
            per_memory_gb: DEFAULT_PER_MEMORY_GB,
            is_default: true,
            updated_at: None,
            updated_by: None,
        }
    }
}

impl PricingRate {
    /// A stored rate built from a validated update
    pub fn from_update(update: &RateUpdate, updated_by: &str) -> Self {
        Self {
            per_cpu_core: update.per_cpu_core(),
            per_memory_gb: update.per_memory_gb(),
            is_default: false,
            updated_at: Some(chrono::Utc::now().format(UPDATED_AT_FORMAT).to_string()),
            updated_by: Some(updated_by.to_string()),
        }
    }

    /// Whether both rates are usable for cost math
    pub fn is_valid(&self) -> bool {
        is_valid_rate(self.per_cpu_core) && is_valid_rate(self.per_memory_gb)
    }
}

fn is_valid_rate(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// A rate as submitted by a caller: a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateInput {
    Number(f64),
    Text(String),
}

impl From<f64> for RateInput {
    fn from(value: f64) -> Self {
        RateInput::Number(value)
    }
}

impl From<&str> for RateInput {
    fn from(value: &str) -> Self {
        RateInput::Text(value.to_string())
    }
}

impl RateInput {
    fn parse(&self, field: &'static str) -> Result<f64, PricingError> {
        let value = match self {
            RateInput::Number(value) => *value,
            RateInput::Text(text) => text.trim().parse::<f64>().map_err(|_| {
                PricingError::InvalidRate {
                    field,
                    reason: format!("'{}' is not a number", text),
                }
            })?,
        };

        if !is_valid_rate(value) {
            return Err(PricingError::InvalidRate {
                field,
                reason: format!("must be a positive number, got {}", value),
            });
        }

        Ok(value)
    }
}

/// A validated pricing update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateUpdate {
    per_cpu_core: f64,
    per_memory_gb: f64,
}

impl RateUpdate {
    /// Validate both rates; nothing is accepted unless both are positive numbers
    pub fn parse(per_cpu_core: &RateInput, per_memory_gb: &RateInput) -> Result<Self, PricingError> {
        Ok(Self {
            per_cpu_core: per_cpu_core.parse("per_cpu_core")?,
            per_memory_gb: per_memory_gb.parse("per_memory_gb")?,
        })
    }

    pub fn new(per_cpu_core: f64, per_memory_gb: f64) -> Result<Self, PricingError> {
        Self::parse(&per_cpu_core.into(), &per_memory_gb.into())
    }

    pub fn per_cpu_core(&self) -> f64 {
        self.per_cpu_core
    }

    pub fn per_memory_gb(&self) -> f64 {
        self.per_memory_gb
    }
}

/// Storage for the pricing rate
pub trait PricingStore: Send + Sync {
    /// Current rate; the default rate when nothing usable is stored
    fn read(&self) -> PricingRate;

    /// Replace the stored rate
    fn write(&self, update: &RateUpdate, updated_by: &str) -> Result<PricingRate, PricingError>;
}

/// Pricing store kept in memory
#[derive(Debug, Default)]
pub struct MemoryPricingStore {
    rate: RwLock<Option<PricingRate>>,
}

impl MemoryPricingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PricingStore for MemoryPricingStore {
    fn read(&self) -> PricingRate {
        self.rate
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_default()
    }

    fn write(&self, update: &RateUpdate, updated_by: &str) -> Result<PricingRate, PricingError> {
        let rate = PricingRate::from_update(update, updated_by);
        *self.rate.write().unwrap_or_else(PoisonError::into_inner) = Some(rate.clone());
        Ok(rate)
    }
}
