//! Data types sent to the client over WebSocket and over the instance API.
//! Keep this module minimal and stable; it defines the wire format.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cpu,
    Gpu,
    Memory,
    Disk,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Cpu, Metric::Gpu, Metric::Memory, Metric::Disk];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Cpu => "cpu",
            Metric::Gpu => "gpu",
            Metric::Memory => "memory",
            Metric::Disk => "disk",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pushed message. Tagged by `metric` so consumers dispatch on the tag,
/// never on arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "lowercase")]
pub enum MetricSample {
    Cpu { value: f64, timestamp: i64 },
    Gpu { value: f64, timestamp: i64 },
    Memory { value: f64, timestamp: i64 },
    Disk { used: f64, free: f64, timestamp: i64 },
}

impl MetricSample {
    pub fn metric(&self) -> Metric {
        match self {
            MetricSample::Cpu { .. } => Metric::Cpu,
            MetricSample::Gpu { .. } => Metric::Gpu,
            MetricSample::Memory { .. } => Metric::Memory,
            MetricSample::Disk { .. } => Metric::Disk,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            MetricSample::Cpu { timestamp, .. }
            | MetricSample::Gpu { timestamp, .. }
            | MetricSample::Memory { timestamp, .. }
            | MetricSample::Disk { timestamp, .. } => *timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: i64,
    pub name: String,
    pub ip: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewInstance {
    pub name: String,
    pub ip: String,
}
