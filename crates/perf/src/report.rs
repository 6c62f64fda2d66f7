//! Result collection and summary output

use crate::utils::{format_duration, format_size, format_throughput, Timing};
use std::collections::BTreeMap;
use std::time::Duration;

/// Upper bound on the mean time per operation.
#[derive(Clone, Copy, Debug)]
pub struct Target {
    pub label: &'static str,
    pub per_op: Duration,
}

#[derive(Clone, Debug)]
pub struct Entry {
    pub name: String,
    pub size: Option<usize>,
    pub timing: Timing,
    pub ops: usize,
    pub target: Option<Target>,
}

impl Entry {
    pub fn passed(&self) -> Option<bool> {
        self.target
            .map(|target| self.timing.per_op(self.ops) <= target.per_op)
    }
}

#[derive(Default)]
pub struct Report {
    groups: BTreeMap<&'static str, Vec<Entry>>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a benchmark and prints its line.
    pub fn record(
        &mut self,
        group: &'static str,
        name: &str,
        size: Option<usize>,
        ops: usize,
        timing: Timing,
    ) {
        self.push(group, name, size, ops, timing, None);
    }

    /// Records a benchmark checked against a per-operation target.
    pub fn record_with_target(
        &mut self,
        group: &'static str,
        name: &str,
        size: Option<usize>,
        ops: usize,
        timing: Timing,
        target: Target,
    ) {
        self.push(group, name, size, ops, timing, Some(target));
    }

    fn push(
        &mut self,
        group: &'static str,
        name: &str,
        size: Option<usize>,
        ops: usize,
        timing: Timing,
        target: Option<Target>,
    ) {
        let entry = Entry {
            name: name.to_string(),
            size,
            timing,
            ops,
            target,
        };
        println!("    {}", line(&entry));
        self.groups.entry(group).or_default().push(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.groups.values().flatten()
    }

    pub fn print_summary(&self) {
        println!();
        println!("==================== SUMMARY ====================");

        for (group, entries) in &self.groups {
            println!("[{}]", group);
            for entry in entries {
                println!("  {}", line(entry));
            }
            println!();
        }

        let checked: Vec<bool> = self.entries().filter_map(Entry::passed).collect();
        if !checked.is_empty() {
            let failed = checked.iter().filter(|passed| !**passed).count();
            println!(
                "Targets: {} passed, {} failed, {} total",
                checked.len() - failed,
                failed,
                checked.len()
            );
        }
    }

    /// Number of entries that missed their target.
    pub fn failures(&self) -> usize {
        self.entries()
            .filter(|entry| entry.passed() == Some(false))
            .count()
    }
}

fn line(entry: &Entry) -> String {
    let status = match entry.passed() {
        Some(true) => "ok ",
        Some(false) => "MISS",
        None => "   ",
    };
    let size = entry
        .size
        .map(|s| format!("[{:>5}]", format_size(s)))
        .unwrap_or_else(|| " ".repeat(7));
    let target = entry
        .target
        .map(|t| format!(" (target {}: {})", t.label, format_duration(t.per_op)))
        .unwrap_or_default();

    format!(
        "{:<4} {:<28} {} mean {:>10}  median {:>10}  p99 {:>10} (n={})  {:>14}{}",
        status,
        entry.name,
        size,
        format_duration(entry.timing.mean),
        format_duration(entry.timing.median),
        format_duration(entry.timing.p99),
        entry.timing.samples,
        format_throughput(entry.timing.ops_per_sec(entry.ops)),
        target
    )
}
