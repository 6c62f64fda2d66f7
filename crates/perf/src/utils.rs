//! Measurement helpers

use std::time::{Duration, Instant};

/// Measured iterations per benchmark
pub const ITERATIONS: usize = 200;

/// Unmeasured iterations run first
pub const WARMUP_ITERATIONS: usize = 20;

/// Object counts to test
pub const SIZES: [usize; 4] = [10, 100, 1_000, 10_000];

/// Counts for benchmarks that re-evaluate per object
pub const SMALL_SIZES: [usize; 3] = [10, 100, 1_000];

/// Times `f` over `iterations` runs after a warmup.
pub fn measure<F, R>(iterations: usize, mut f: F) -> Timing
where
    F: FnMut() -> R,
{
    for _ in 0..WARMUP_ITERATIONS {
        std::hint::black_box(f());
    }

    let samples = (0..iterations)
        .map(|_| {
            let start = Instant::now();
            std::hint::black_box(f());
            start.elapsed()
        })
        .collect::<Vec<_>>();

    Timing::from_samples(samples)
}

/// Times `f` on fresh input from `setup`; setup is not measured.
pub fn measure_with_setup<S, F, T, R>(iterations: usize, mut setup: S, mut f: F) -> Timing
where
    S: FnMut() -> T,
    F: FnMut(T) -> R,
{
    for _ in 0..WARMUP_ITERATIONS {
        let input = setup();
        std::hint::black_box(f(input));
    }

    let mut samples = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let input = setup();
        let start = Instant::now();
        std::hint::black_box(f(input));
        samples.push(start.elapsed());
    }

    Timing::from_samples(samples)
}

/// Summary statistics of one benchmark.
#[derive(Clone, Debug)]
pub struct Timing {
    pub median: Duration,
    pub mean: Duration,
    pub p99: Duration,
    pub samples: usize,
}

impl Timing {
    pub fn from_samples(mut samples: Vec<Duration>) -> Self {
        samples.sort_unstable();

        let count = samples.len();
        if count == 0 {
            return Self {
                median: Duration::ZERO,
                mean: Duration::ZERO,
                p99: Duration::ZERO,
                samples: 0,
            };
        }

        let total: Duration = samples.iter().sum();
        Self {
            median: samples[count / 2],
            mean: total / count as u32,
            p99: samples[(count * 99 / 100).min(count - 1)],
            samples: count,
        }
    }

    /// Operations per second when one run handles `ops` operations.
    pub fn ops_per_sec(&self, ops: usize) -> f64 {
        let secs = self.mean.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            ops as f64 / secs
        }
    }

    /// Mean time per operation when one run handles `ops` operations.
    pub fn per_op(&self, ops: usize) -> Duration {
        self.mean / ops.max(1) as u32
    }
}

pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    match nanos {
        0..=999 => format!("{} ns", nanos),
        1_000..=999_999 => format!("{:.2} μs", nanos as f64 / 1e3),
        1_000_000..=999_999_999 => format!("{:.2} ms", nanos as f64 / 1e6),
        _ => format!("{:.2} s", nanos as f64 / 1e9),
    }
}

pub fn format_throughput(ops_per_sec: f64) -> String {
    if ops_per_sec >= 1e6 {
        format!("{:.2}M ops/s", ops_per_sec / 1e6)
    } else if ops_per_sec >= 1e3 {
        format!("{:.2}K ops/s", ops_per_sec / 1e3)
    } else {
        format!("{:.2} ops/s", ops_per_sec)
    }
}

pub fn format_size(size: usize) -> String {
    match size {
        s if s >= 1_000_000 => format!("{}M", s / 1_000_000),
        s if s >= 1_000 => format!("{}K", s / 1_000),
        s => s.to_string(),
    }
}
