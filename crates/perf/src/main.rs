//! Vermut throughput benchmarks.
//!
//! Run with: cargo run -p vermut-perf --release [group...]
//! Set `RUST_LOG=vermut_reactive=debug` to trace flushes.

mod bench;
mod report;
mod utils;

use report::Report;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

type Group = (&'static str, fn(&mut Report));

const GROUPS: [Group; 3] = [
    ("mark", bench::mark::run),
    ("flush", bench::flush::run),
    ("selector", bench::selector::run),
];

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let selected: Vec<String> = std::env::args().skip(1).collect();
    let mut report = Report::new();

    for (name, run) in GROUPS {
        if !selected.is_empty() && !selected.iter().any(|s| s == name) {
            continue;
        }
        info!(group = name, "running benchmarks");
        println!("\n== {} ==", name);
        run(&mut report);
    }

    report.print_summary();

    if report.failures() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
