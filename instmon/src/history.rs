//! Bounded history buffers for charts, and the per-instance dashboard state
//! they feed.

use std::collections::VecDeque;

use crate::types::MetricSample;

/// Points kept per line chart.
pub const WINDOW_CAP: usize = 100;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if cap == 0 {
        return;
    }
    while dq.len() >= cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

/// One chart point: epoch-ms timestamp and value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub ts: i64,
    pub value: f64,
}

// Oldest-evicted ring of the most recent points
#[derive(Debug, Clone)]
pub struct RollingWindow {
    points: VecDeque<Point>,
    cap: usize,
}

impl RollingWindow {
    pub fn new(cap: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, ts: i64, value: f64) {
        push_capped(&mut self.points, Point { ts, value }, self.cap);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn latest(&self) -> Option<Point> {
        self.points.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    /// Last `n` values scaled to 0..=100 against `max`, for sparklines.
    pub fn tail_percent(&self, n: usize, max: f64) -> Vec<u64> {
        let start = self.points.len().saturating_sub(n);
        self.points
            .iter()
            .skip(start)
            .map(|p| {
                if max > 0.0 {
                    (p.value / max * 100.0).clamp(0.0, 100.0).round() as u64
                } else {
                    0
                }
            })
            .collect()
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new(WINDOW_CAP)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskSnapshot {
    pub used: f64,
    pub free: f64,
    pub ts: i64,
}

impl DiskSnapshot {
    pub fn used_percent(&self) -> u16 {
        let total = self.used + self.free;
        if total > 0.0 {
            (self.used / total * 100.0).clamp(0.0, 100.0).round() as u16
        } else {
            0
        }
    }
}

/// Everything the dashboard shows for one instance.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub cpu: RollingWindow,
    pub gpu: RollingWindow,
    pub memory: RollingWindow,
    pub disk: Option<DiskSnapshot>,
    pub last_ts: Option<i64>,
    pub received: u64,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, sample: MetricSample) {
        let ts = match sample {
            MetricSample::Cpu { value, timestamp } => {
                self.cpu.push(timestamp, value);
                timestamp
            }
            MetricSample::Gpu { value, timestamp } => {
                self.gpu.push(timestamp, value);
                timestamp
            }
            MetricSample::Memory { value, timestamp } => {
                self.memory.push(timestamp, value);
                timestamp
            }
            MetricSample::Disk {
                used,
                free,
                timestamp,
            } => {
                self.disk = Some(DiskSnapshot {
                    used,
                    free,
                    ts: timestamp,
                });
                timestamp
            }
        };
        self.last_ts = Some(self.last_ts.map_or(ts, |prev| prev.max(ts)));
        self.received += 1;
    }

    /// Decode one text frame and apply it. Unknown or malformed payloads are
    /// ignored and reported as `false`.
    pub fn apply_json(&mut self, text: &str) -> bool {
        match serde_json::from_str::<MetricSample>(text) {
            Ok(s) => {
                self.apply(s);
                true
            }
            Err(_) => false,
        }
    }
}
