//! Per-process CPU and memory samples

use super::HostSnapshot;
use crate::units::MemoryUnit;
use serde::{Deserialize, Serialize};
use tracing::debug;

const PROCESS_KEY_PREFIXES: &[&str] = &["proc.cpu.util", "proc.mem", "process."];

const NAME_NOISE: &[&str] = &["CPU utilization of ", "Memory usage of ", "Process "];

const UNKNOWN_PROCESS: &str = "Unknown Process";

/// CPU and memory observed for one process name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSample {
    pub name: String,
    pub cpu_percent: f64,
    /// Memory value as sampled
    pub memory_raw: f64,
    /// Declared unit of the memory item; `None` means bytes are assumed
    pub memory_unit: Option<MemoryUnit>,
}

impl ProcessSample {
    fn empty(name: String) -> Self {
        Self {
            name,
            cpu_percent: 0.0,
            memory_raw: 0.0,
            memory_unit: None,
        }
    }

    /// Memory in GB, using the declared unit or bytes when none was declared
    pub fn memory_gb(&self, host_memory_gb: f64) -> f64 {
        self.memory_unit
            .unwrap_or(MemoryUnit::Bytes)
            .to_gb(self.memory_raw, host_memory_gb)
    }
}

/// Derive a process name from an item key parameter or its display name
///
/// The first bracketed key parameter wins unless it is empty or a bare
/// wildcard once quotes and `,*` are stripped.
pub fn extract_process_name(key: &str, name: &str) -> String {
    if let Some(param) = first_bracket_param(key) {
        let cleaned = param.replace(['"', '\''], "").replace(",*", "");
        if !cleaned.is_empty() && cleaned != "*" {
            return cleaned;
        }
    }

    let cleaned = NAME_NOISE
        .iter()
        .fold(name.to_string(), |acc, noise| acc.replace(noise, ""));
    if cleaned.is_empty() {
        UNKNOWN_PROCESS.to_string()
    } else {
        cleaned
    }
}

fn first_bracket_param(key: &str) -> Option<&str> {
    let start = key.find('[')? + 1;
    let len = key[start..].find(']')?;
    Some(&key[start..start + len])
}

fn is_process_key(key: &str) -> bool {
    PROCESS_KEY_PREFIXES.iter().any(|p| key.starts_with(p))
}

/// Collect distinct processes, in first-seen order
pub(crate) fn resolve_processes(snapshot: &HostSnapshot) -> Vec<ProcessSample> {
    let mut processes: Vec<ProcessSample> = Vec::new();

    for item in snapshot.items.iter().filter(|i| is_process_key(&i.key)) {
        let Some(value) = snapshot.numeric(item).filter(|v| *v > 0.0) else {
            continue;
        };

        let name = extract_process_name(&item.key, &item.name);
        let index = match processes.iter().position(|p| p.name == name) {
            Some(index) => index,
            None => {
                processes.push(ProcessSample::empty(name));
                processes.len() - 1
            }
        };
        let entry = &mut processes[index];

        if item.key.contains("cpu") {
            entry.cpu_percent = value;
        } else if item.key.contains("mem") {
            entry.memory_raw = value;
            entry.memory_unit = MemoryUnit::from_declared(&item.units);
            if entry.memory_unit.is_none() && !item.units.is_empty() {
                debug!(
                    key = %item.key,
                    units = %item.units,
                    "Unrecognised process memory unit, assuming bytes"
                );
            }
        }
    }

    processes
}

/// Processes ordered by CPU usage, highest first, capped at `limit`
pub fn top_processes(processes: &[ProcessSample], limit: usize) -> Vec<ProcessSample> {
    let mut sorted = processes.to_vec();
    sorted.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_name_from_key_parameter() {
        assert_eq!(extract_process_name("proc.cpu.util[nginx]", ""), "nginx");
        assert_eq!(
            extract_process_name("proc.mem[\"postgres\",,,]", ""),
            "postgres,,,"
        );
        assert_eq!(extract_process_name("proc.mem['java',*]", ""), "java");
    }

    #[test]
    fn test_extract_name_falls_back_to_display_name() {
        assert_eq!(
            extract_process_name("proc.cpu.util[*]", "CPU utilization of redis"),
            "redis"
        );
        assert_eq!(
            extract_process_name("process.cpu", "Process worker"),
            "worker"
        );
        assert_eq!(extract_process_name("proc.mem[]", ""), UNKNOWN_PROCESS);
    }

    #[test]
    fn test_top_processes_orders_and_caps() {
        let processes: Vec<ProcessSample> = (0..15)
            .map(|i| ProcessSample {
                name: format!("p{}", i),
                cpu_percent: i as f64,
                memory_raw: 0.0,
                memory_unit: None,
            })
            .collect();

        let top = top_processes(&processes, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].name, "p14");
        assert_eq!(top[9].name, "p5");
    }

    #[test]
    fn test_memory_gb_defaults_to_bytes() {
        let sample = ProcessSample {
            name: "java".to_string(),
            cpu_percent: 0.0,
            memory_raw: 1_073_741_824.0,
            memory_unit: None,
        };
        assert_eq!(sample.memory_gb(16.0), 1.0);

        let percent = ProcessSample {
            memory_raw: 50.0,
            memory_unit: Some(MemoryUnit::Percent),
            ..sample
        };
        assert_eq!(percent.memory_gb(16.0), 8.0);
    }
}
