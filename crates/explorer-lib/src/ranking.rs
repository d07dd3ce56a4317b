//! Host ordering and pagination

use crate::report::HostReport;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Fields hosts can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    CpuCores,
    MemoryGb,
    CpuCost,
    MemoryCost,
    TotalCost,
}

impl SortField {
    /// Parse a field name; unknown names yield `None`
    pub fn parse(field: &str) -> Option<Self> {
        match field {
            "name" => Some(SortField::Name),
            "cpu_cores" => Some(SortField::CpuCores),
            "memory_gb" => Some(SortField::MemoryGb),
            "cpu_cost" => Some(SortField::CpuCost),
            "memory_cost" => Some(SortField::MemoryCost),
            "total_cost" => Some(SortField::TotalCost),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::CpuCores => "cpu_cores",
            SortField::MemoryGb => "memory_gb",
            SortField::CpuCost => "cpu_cost",
            SortField::MemoryCost => "memory_cost",
            SortField::TotalCost => "total_cost",
        }
    }

    fn numeric(&self, host: &HostReport) -> f64 {
        match self {
            SortField::Name => 0.0,
            SortField::CpuCores => host.resource.cpu_cores,
            SortField::MemoryGb => host.resource.memory_total_gb,
            SortField::CpuCost => host.cost.cpu.hourly,
            SortField::MemoryCost => host.cost.memory.hourly,
            SortField::TotalCost => host.cost.total.hourly,
        }
    }

    fn compare(&self, a: &HostReport, b: &HostReport) -> Ordering {
        match self {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            _ => self.numeric(a).total_cmp(&self.numeric(b)),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

/// Sort hosts in place
///
/// The sort is stable: hosts with equal keys keep their input order in both
/// directions. An unknown field leaves the order untouched.
pub fn sort_hosts(hosts: &mut [HostReport], field: &str, order: SortOrder) {
    let Some(field) = SortField::parse(field) else {
        return;
    };

    hosts.sort_by(|a, b| {
        let ordering = field.compare(a, b);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// One page of a larger result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually returned
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice out one page; out-of-range pages are clamped to the nearest valid page
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = ((total_items + page_size - 1) / page_size).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);
    let slice = if start < total_items {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };

    Page {
        items: slice,
        page,
        page_size,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    fn names(hosts: &[HostReport]) -> Vec<&str> {
        hosts.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn test_sort_by_name_is_case_insensitive() {
        let mut hosts = vec![
            sample_report("web-02", 2.0, 4.0),
            sample_report("Alpha", 1.0, 2.0),
            sample_report("beta", 4.0, 8.0),
        ];
        sort_hosts(&mut hosts, "name", SortOrder::Asc);
        assert_eq!(names(&hosts), vec!["Alpha", "beta", "web-02"]);
    }

    #[test]
    fn test_total_cost_desc_then_asc_reverses() {
        let mut hosts = vec![
            sample_report("a", 2.0, 4.0),
            sample_report("b", 8.0, 32.0),
            sample_report("c", 1.0, 1.0),
            sample_report("d", 4.0, 16.0),
        ];

        sort_hosts(&mut hosts, "total_cost", SortOrder::Desc);
        let desc: Vec<String> = hosts.iter().map(|h| h.name.clone()).collect();
        assert_eq!(desc, vec!["b", "d", "a", "c"]);

        sort_hosts(&mut hosts, "total_cost", SortOrder::Asc);
        let mut asc: Vec<String> = hosts.iter().map(|h| h.name.clone()).collect();
        asc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_unknown_field_keeps_order() {
        let mut hosts = vec![
            sample_report("z", 2.0, 4.0),
            sample_report("a", 1.0, 2.0),
        ];
        sort_hosts(&mut hosts, "uptime", SortOrder::Desc);
        assert_eq!(names(&hosts), vec!["z", "a"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut hosts = vec![
            sample_report("first", 2.0, 4.0),
            sample_report("second", 2.0, 8.0),
            sample_report("third", 1.0, 2.0),
        ];
        sort_hosts(&mut hosts, "cpu_cores", SortOrder::Desc);
        assert_eq!(names(&hosts), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=23).collect();

        let first = paginate(&items, 1, 10);
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 3);

        let last = paginate(&items, 3, 10);
        assert_eq!(last.items, vec![21, 22, 23]);

        let clamped = paginate(&items, 9, 10);
        assert_eq!(clamped.page, 3);
        assert_eq!(clamped.items.len(), 3);

        let empty = paginate::<u32>(&[], 1, 10);
        assert!(empty.items.is_empty());
        assert_eq!(empty.total_pages, 1);
    }
}
