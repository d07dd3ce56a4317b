//! Resolver tests over in-memory host snapshots

use super::*;
use crate::models::{ItemStatus, ValueType};

/// Snapshot builder: (key, name, latest value)
fn snapshot(items: &[(&str, &str, Option<&str>)]) -> HostSnapshot {
    let mut monitored = Vec::new();
    let mut samples = HashMap::new();

    for (i, (key, name, value)) in items.iter().enumerate() {
        let item_id = format!("{}", 1000 + i);
        monitored.push(MonitoredItem {
            item_id: item_id.clone(),
            key: key.to_string(),
            name: name.to_string(),
            value_type: ValueType::Float,
            units: String::new(),
            status: ItemStatus::Active,
        });
        if let Some(value) = value {
            samples.insert(item_id, ItemSample::new(*value, 1_700_000_000));
        }
    }

    HostSnapshot::new(monitored, samples)
}

fn resolver() -> MetricResolver {
    MetricResolver::default()
}

mod capacity_tests {
    use super::*;

    #[test]
    fn test_exact_cpu_key_follows_list_order() {
        // hw.cpu.num is listed after system.cpu.num, so item order must not matter
        let snap = snapshot(&[
            ("hw.cpu.num", "CPUs", Some("2")),
            ("system.cpu.num", "Number of CPUs", Some("8")),
        ]);

        let resolved = resolver().resolve_cpu_cores(&snap).into_option().unwrap();
        assert_eq!(resolved.value, 8.0);
        assert_eq!(resolved.item_key, "system.cpu.num");
        assert_eq!(resolved.strategy, Strategy::ExactKey);
    }

    #[test]
    fn test_malformed_exact_sample_falls_through() {
        let snap = snapshot(&[
            ("system.cpu.num", "Number of CPUs", Some("n/a")),
            ("system.cpu.num[]", "Number of CPUs", None),
            ("hw.cpu.num", "CPUs", Some("4")),
        ]);

        let resolved = resolver().resolve_cpu_cores(&snap).into_option().unwrap();
        assert_eq!(resolved.value, 4.0);
        assert_eq!(resolved.item_key, "hw.cpu.num");
    }

    #[test]
    fn test_partial_cpu_match_requires_positive_value() {
        let snap = snapshot(&[
            ("system.cpu.num[online]", "Online CPUs", Some("0")),
            ("custom.cpu", "CPU num", Some("6")),
        ]);

        let resolved = resolver().resolve_cpu_cores(&snap).into_option().unwrap();
        assert_eq!(resolved.value, 6.0);
        assert_eq!(resolved.strategy, Strategy::PartialKey);
        assert_eq!(resolved.item_key, "custom.cpu");
    }

    #[test]
    fn test_unresolved_cpu() {
        let snap = snapshot(&[("agent.ping", "Agent ping", Some("1"))]);
        assert_eq!(resolver().resolve_cpu_cores(&snap), Resolution::Unresolved);
    }

    #[test]
    fn test_memory_exact_key_is_bytes() {
        let snap = snapshot(&[("vm.memory.size[total]", "Total memory", Some("8589934592"))]);
        let profile = resolver_profile(&snap);
        assert_eq!(profile.memory_total_gb, 8.0);
        assert_eq!(profile.memory_total_gb_display(), 8.00);
        assert_eq!(profile.memory_total_raw, 8_589_934_592.0);
    }

    #[test]
    fn test_memory_partial_match_applies_magnitude_heuristic() {
        let snap = snapshot(&[
            ("system.cpu.num", "Number of CPUs", Some("2")),
            ("custom.memory.total.gb", "Memory total", Some("16")),
        ]);
        let profile = resolver().resolve(&snap).resource.unwrap();
        assert_eq!(profile.memory_total_gb, 16.0);
        assert_eq!(profile.memory_strategy, Strategy::PartialKey);
    }

    fn resolver_profile(snap: &HostSnapshot) -> ResourceProfile {
        let mut items = snap.items.clone();
        let mut samples = snap.samples.clone();
        items.push(MonitoredItem {
            item_id: "cpu".to_string(),
            key: "system.cpu.num".to_string(),
            name: "Number of CPUs".to_string(),
            value_type: ValueType::Unsigned,
            units: String::new(),
            status: ItemStatus::Active,
        });
        samples.insert("cpu".to_string(), ItemSample::new("4", 0));
        resolver()
            .resolve(&HostSnapshot::new(items, samples))
            .resource
            .unwrap()
    }

    #[test]
    fn test_host_without_memory_has_no_profile() {
        let snap = snapshot(&[("system.cpu.num", "Number of CPUs", Some("4"))]);
        assert!(resolver().resolve(&snap).resource.is_none());
    }
}

mod cpu_usage_tests {
    use super::*;

    #[test]
    fn test_idle_metric_is_converted() {
        let config = ResolverConfig {
            cpu_usage_keys: vec!["system.cpu.idle".to_string()],
            ..Default::default()
        };
        let snap = snapshot(&[("system.cpu.idle", "CPU idle time", Some("30"))]);

        let cpu = MetricResolver::new(config).resolve_cpu_usage(&snap);
        assert_eq!(cpu.usage_percent(), 70.0);
        assert_eq!(cpu.idle_percent(), 30.0);
        assert_eq!(cpu.source().unwrap().kind, CpuMetricKind::Idle);
    }

    #[test]
    fn test_idle_detected_through_generic_fallback() {
        let snap = snapshot(&[("system.cpu.idle", "CPU idle time", Some("30"))]);

        let cpu = resolver().resolve_cpu_usage(&snap);
        assert_eq!(cpu.usage_percent(), 70.0);
        assert_eq!(cpu.idle_percent(), 30.0);
        assert_eq!(cpu.source().unwrap().strategy, Strategy::Generic);

        let snap = snapshot(&[("perf_counter[cpu_idle]", "CPU Idle usage", Some("30"))]);
        let cpu = resolver().resolve_cpu_usage(&snap);
        assert_eq!(cpu.usage_percent(), 70.0);
        assert_eq!(cpu.source().unwrap().kind, CpuMetricKind::Idle);
    }

    #[test]
    fn test_unrelated_items_leave_cpu_unresolved() {
        let snap = snapshot(&[("system.cpu.load[all,avg1]", "Load average", Some("0.7"))]);
        let cpu = resolver().resolve_cpu_usage(&snap);
        assert!(cpu.source().is_none());
    }

    #[test]
    fn test_exact_beats_partial() {
        let snap = snapshot(&[
            ("system.cpu.util[,user]", "CPU user time", Some("12")),
            ("system.cpu.util", "CPU utilization", Some("42.5")),
        ]);

        let cpu = resolver().resolve_cpu_usage(&snap);
        assert_eq!(cpu.usage_percent(), 42.5);
        assert_eq!(cpu.source().unwrap().strategy, Strategy::ExactKey);
    }

    #[test]
    fn test_partial_match_with_parameters() {
        let snap = snapshot(&[("system.cpu.util[,user]", "CPU user time", Some("12"))]);

        let cpu = resolver().resolve_cpu_usage(&snap);
        assert_eq!(cpu.usage_percent(), 12.0);
        assert_eq!(cpu.source().unwrap().strategy, Strategy::PartialKey);
    }

    #[test]
    fn test_usage_is_clamped() {
        let snap = snapshot(&[("system.cpu.util", "CPU utilization", Some("140"))]);
        let cpu = resolver().resolve_cpu_usage(&snap);
        assert_eq!(cpu.usage_percent(), 100.0);
        assert_eq!(cpu.idle_percent(), 0.0);

        let snap = snapshot(&[("system.cpu.util", "CPU idle", Some("130"))]);
        let cpu = resolver().resolve_cpu_usage(&snap);
        assert_eq!(cpu.usage_percent(), 0.0);
        assert_eq!(cpu.idle_percent(), 100.0);
    }

    #[test]
    fn test_usage_and_idle_sum_to_hundred() {
        for value in ["0", "0.1", "33.3", "49.99", "50", "87.125", "100"] {
            let snap = snapshot(&[("system.cpu.util", "CPU utilization", Some(value))]);
            let cpu = resolver().resolve_cpu_usage(&snap);
            assert!((0.0..=100.0).contains(&cpu.usage_percent()));
            assert!((0.0..=100.0).contains(&cpu.idle_percent()));
            assert_eq!(cpu.idle_percent(), 100.0 - cpu.usage_percent());
        }
    }

    #[test]
    fn test_unresolved_cpu_usage_defaults_to_idle() {
        let cpu = resolver().resolve_cpu_usage(&snapshot(&[]));
        assert_eq!(cpu.usage_percent(), 0.0);
        assert_eq!(cpu.idle_percent(), 100.0);
    }

    #[test]
    fn test_missing_sample_falls_back_to_next_tier() {
        let snap = snapshot(&[
            ("system.cpu.util", "CPU utilization", None),
            ("custom.cpu.util.total", "CPU total", Some("25")),
        ]);
        let cpu = resolver().resolve_cpu_usage(&snap);
        assert_eq!(cpu.usage_percent(), 25.0);
        assert_eq!(cpu.source().unwrap().item_key, "custom.cpu.util.total");
    }
}

mod memory_usage_tests {
    use super::*;

    #[test]
    fn test_used_derives_free() {
        let snap = snapshot(&[
            ("vm.memory.size[total]", "Total memory", Some("8589934592")),
            ("vm.memory.size[used]", "Used memory", Some("2147483648")),
        ]);
        let memory = resolver().resolve(&snap).usage.memory;
        assert_eq!(memory.total_gb, 8.0);
        assert_eq!(memory.used_gb, 2.0);
        assert_eq!(memory.free_gb, 6.0);
        assert_eq!(memory.usage_percent, 25.0);
    }

    #[test]
    fn test_available_derives_used() {
        let snap = snapshot(&[
            ("vm.memory.size[available]", "Available memory", Some("6442450944")),
            ("vm.memory.size[total]", "Total memory", Some("8589934592")),
        ]);
        let memory = resolver().resolve(&snap).usage.memory;
        assert_eq!(memory.used_gb, 2.0);
        assert_eq!(memory.free_gb, 6.0);
        assert_eq!(memory.usage_percent, 25.0);
        assert_eq!(memory.readings.free, Some(6_442_450_944.0));
    }

    #[test]
    fn test_no_memory_items_yields_zero_percent() {
        let snap = snapshot(&[("system.cpu.num", "Number of CPUs", Some("4"))]);
        let memory = resolver().resolve(&snap).usage.memory;
        assert_eq!(memory.usage_percent, 0.0);
        assert_eq!(memory.total_gb, 0.0);
        assert!(!memory.usage_percent.is_nan());
    }

    #[test]
    fn test_total_already_in_gb() {
        let snap = snapshot(&[
            ("custom.memory.total", "Memory", Some("32")),
            ("custom.memory.used", "Memory used", Some("8")),
        ]);
        let memory = resolver().resolve(&snap).usage.memory;
        assert_eq!(memory.total_gb, 32.0);
        assert_eq!(memory.used_gb, 8.0);
        assert_eq!(memory.usage_percent, 25.0);
    }
}

mod process_tests {
    use super::*;

    #[test]
    fn test_processes_merge_cpu_and_memory() {
        let snap = snapshot(&[
            ("proc.cpu.util[nginx]", "CPU utilization of nginx", Some("12.5")),
            ("proc.mem[nginx]", "Memory usage of nginx", Some("1073741824")),
            ("proc.cpu.util[redis]", "CPU utilization of redis", Some("0")),
            ("proc.mem[postgres]", "Memory usage of postgres", Some("abc")),
        ]);

        let processes = resolver().resolve(&snap).processes;
        assert_eq!(processes.len(), 1);
        assert_eq!(processes[0].name, "nginx");
        assert_eq!(processes[0].cpu_percent, 12.5);
        assert_eq!(processes[0].memory_raw, 1_073_741_824.0);
    }

    #[test]
    fn test_later_item_overwrites_same_field() {
        let snap = snapshot(&[
            ("proc.cpu.util[java]", "CPU utilization of java", Some("10")),
            ("proc.mem[java]", "Memory usage of java", Some("100")),
            ("proc.cpu.util[\"java\"]", "CPU utilization of java", Some("20")),
        ]);

        let processes = resolver().resolve(&snap).processes;
        assert_eq!(processes.len(), 1);
        assert_eq!(processes[0].cpu_percent, 20.0);
        assert_eq!(processes[0].memory_raw, 100.0);
    }

    #[test]
    fn test_declared_unit_is_read() {
        let mut snap = snapshot(&[("proc.mem[java,,,,pmem]", "Memory of java", Some("25"))]);
        snap.items[0].units = "%".to_string();

        let processes = resolver().resolve(&snap).processes;
        assert_eq!(processes[0].memory_unit, Some(crate::units::MemoryUnit::Percent));
        assert_eq!(processes[0].memory_gb(8.0), 2.0);
    }
}
