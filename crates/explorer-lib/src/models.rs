//! Core data models for the cost explorer

use serde::{Deserialize, Serialize};

/// Declared value type of a monitored item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Float,
    Char,
    Log,
    Unsigned,
    Text,
}

impl ValueType {
    /// Map the platform's numeric value type code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ValueType::Float),
            1 => Some(ValueType::Char),
            2 => Some(ValueType::Log),
            3 => Some(ValueType::Unsigned),
            4 => Some(ValueType::Text),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Float | ValueType::Unsigned)
    }
}

/// Whether an item is collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Active,
    Disabled,
}

/// One telemetry series definition attached to a host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoredItem {
    pub item_id: String,
    pub key: String,
    pub name: String,
    pub value_type: ValueType,
    /// Declared unit (e.g. "B", "%"), empty when the item has none
    #[serde(default)]
    pub units: String,
    pub status: ItemStatus,
}

/// Latest observed value of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSample {
    /// Raw value as reported by the platform
    pub value: Option<String>,
    /// Unix timestamp of the observation
    pub timestamp: Option<i64>,
}

impl ItemSample {
    pub fn new(value: impl Into<String>, timestamp: i64) -> Self {
        Self {
            value: Some(value.into()),
            timestamp: Some(timestamp),
        }
    }

    /// The sample as a finite number, or `None` for null and non-numeric values
    pub fn numeric(&self) -> Option<f64> {
        let raw = self.value.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        raw.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// Monitoring state of a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Monitored,
    Unmonitored,
}

/// A monitored machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub host_id: String,
    pub name: String,
    pub status: HostStatus,
    /// Host has a primary agent interface
    pub has_agent_interface: bool,
    #[serde(default)]
    pub group_ids: Vec<String>,
}

/// Host selection applied before any resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostFilter {
    /// Case-insensitive substring of the host name
    pub name: Option<String>,
    pub group_ids: Vec<String>,
    pub show_inactive: bool,
}

impl HostFilter {
    /// In-memory evaluation of the filter
    pub fn matches(&self, host: &Host) -> bool {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            if !host.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }

        if !self.group_ids.is_empty()
            && !host.group_ids.iter().any(|g| self.group_ids.contains(g))
        {
            return false;
        }

        self.show_inactive || host.status == HostStatus::Monitored
    }
}
