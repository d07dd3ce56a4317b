//! Unit normalization
//!
//! Conversions shared by the resolver and the cost calculator. Values are
//! kept at full precision; rounding is only for display fields.

/// Bytes in one gigabyte (binary)
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Raw memory values above this are taken as bytes, anything else as GB
pub const BYTES_MAGNITUDE_THRESHOLD: f64 = 1_000_000_000.0;

/// Convert bytes to gigabytes
#[inline]
pub fn bytes_to_gb(bytes: f64) -> f64 {
    bytes / BYTES_PER_GB
}

/// Whether a raw memory value looks like a byte count
///
/// Known to misclassify byte values at or below 1e9 (under ~0.93 GB) as GB.
#[inline]
pub fn looks_like_bytes(raw: f64) -> bool {
    raw > BYTES_MAGNITUDE_THRESHOLD
}

/// Normalize a memory value of unknown unit to GB using the magnitude heuristic
#[inline]
pub fn normalize_memory_gb(raw: f64) -> f64 {
    if looks_like_bytes(raw) {
        bytes_to_gb(raw)
    } else {
        raw
    }
}

/// Round to two decimal places for display
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Clamp a percentage into [0, 100]
#[inline]
pub fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// `part / total * 100`, or 0 when the total is zero
#[inline]
pub fn percent_of(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    part / total * 100.0
}

/// Convert an idle percentage into a usage percentage
#[inline]
pub fn idle_to_usage(idle: f64) -> f64 {
    100.0 - idle
}

/// Declared unit of a memory value
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryUnit {
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
    /// Percentage of the host's total memory
    Percent,
}

impl MemoryUnit {
    /// Parse an item's declared unit; empty or unrecognised units yield `None`
    pub fn from_declared(units: &str) -> Option<Self> {
        match units.trim() {
            "B" => Some(MemoryUnit::Bytes),
            "KB" | "K" | "KiB" => Some(MemoryUnit::Kilobytes),
            "MB" | "M" | "MiB" => Some(MemoryUnit::Megabytes),
            "GB" | "G" | "GiB" => Some(MemoryUnit::Gigabytes),
            "%" => Some(MemoryUnit::Percent),
            _ => None,
        }
    }

    /// Convert a value in this unit to GB
    pub fn to_gb(&self, value: f64, host_memory_gb: f64) -> f64 {
        match self {
            MemoryUnit::Bytes => bytes_to_gb(value),
            MemoryUnit::Kilobytes => value / (1024.0 * 1024.0),
            MemoryUnit::Megabytes => value / 1024.0,
            MemoryUnit::Gigabytes => value,
            MemoryUnit::Percent => value / 100.0 * host_memory_gb,
        }
    }
}
