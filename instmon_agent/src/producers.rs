//! Simulated metric producers. Stateless: every call draws fresh uniform noise,
//! nothing is carried between ticks.

use rand::Rng;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::types::{Metric, MetricSample};

pub const CPU_PERIOD: Duration = Duration::from_millis(1000);
pub const GPU_PERIOD: Duration = Duration::from_millis(100);
pub const MEMORY_PERIOD: Duration = Duration::from_millis(10_000);
pub const DISK_PERIOD: Duration = Duration::from_millis(15_000);

pub const PERCENT_MAX: f64 = 100.0;
pub const MEMORY_MAX_GB: f64 = 64.0;
// Placeholder capacity; there is no real disk behind an instance.
pub const DISK_TOTAL_GB: f64 = 20.0;

impl Metric {
    pub fn period(self) -> Duration {
        match self {
            Metric::Cpu => CPU_PERIOD,
            Metric::Gpu => GPU_PERIOD,
            Metric::Memory => MEMORY_PERIOD,
            Metric::Disk => DISK_PERIOD,
        }
    }
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn uniform<R: Rng>(rng: &mut R, max: f64) -> f64 {
    round2(rng.random_range(0.0..=max))
}

/// Draw one sample for `metric` with the thread-local RNG.
pub fn sample(metric: Metric, timestamp: i64) -> MetricSample {
    sample_with(metric, timestamp, &mut rand::rng())
}

pub fn sample_with<R: Rng>(metric: Metric, timestamp: i64, rng: &mut R) -> MetricSample {
    match metric {
        Metric::Cpu => MetricSample::Cpu {
            value: uniform(rng, PERCENT_MAX),
            timestamp,
        },
        Metric::Gpu => MetricSample::Gpu {
            value: uniform(rng, PERCENT_MAX),
            timestamp,
        },
        Metric::Memory => MetricSample::Memory {
            value: uniform(rng, MEMORY_MAX_GB),
            timestamp,
        },
        Metric::Disk => {
            let used = uniform(rng, DISK_TOTAL_GB);
            MetricSample::Disk {
                used,
                free: round2(DISK_TOTAL_GB - used),
                timestamp,
            }
        }
    }
}
