//! Types that mirror the agent's JSON schema.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "metric", rename_all = "lowercase")]
pub enum MetricSample {
    Cpu { value: f64, timestamp: i64 },
    Gpu { value: f64, timestamp: i64 },
    Memory { value: f64, timestamp: i64 },
    Disk { used: f64, free: f64, timestamp: i64 },
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Instance {
    pub id: i64,
    pub name: String,
    pub ip: String,
}

#[derive(Debug, Serialize)]
pub struct NewInstance<'a> {
    pub name: &'a str,
    pub ip: &'a str,
}
