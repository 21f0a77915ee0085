use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use crate::format::{NOT_AVAILABLE, format_bytes};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One complete reading of every domain, built fresh per capture.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    #[serde(serialize_with = "serialize_local_time")]
    pub timestamp: DateTime<Local>,
    pub system: SystemInfo,
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub disk: DiskInfo,
    pub network: NetworkInfo,
    pub processes: Vec<ProcessSample>,
}

fn serialize_local_time<S: Serializer>(ts: &DateTime<Local>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

/// A value the platform may be unable to report. Serializes as the value
/// itself or as `"N/A"`, so it never collides with a real zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Reading<T> {
    Value(T),
    Unavailable,
}

impl<T> From<Option<T>> for Reading<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Reading::Unavailable, Reading::Value)
    }
}

impl<T: Serialize> Serialize for Reading<T> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Reading::Value(v) => v.serialize(s),
            Reading::Unavailable => s.serialize_str(NOT_AVAILABLE),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct SystemInfo {
    pub system: String,
    pub node: String,
    pub release: String,
    pub version: String,
    pub machine: String,
    pub processor: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CpuInfo {
    pub cpu_percent: f32,
    pub cpu_count: usize,
    /// Mean current clock in MHz.
    pub cpu_freq: Reading<u64>,
    pub per_cpu: Vec<f32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MemoryInfo {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub percent: f64,
    pub total_formatted: String,
    pub available_formatted: String,
    pub used_formatted: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct UsageInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
    pub total_formatted: String,
    pub used_formatted: String,
    pub free_formatted: String,
}

impl UsageInfo {
    pub fn new(total: u64, used: u64, free: u64) -> Self {
        // Percent of the space a non-root user can reach, as `df` reports it.
        let reachable = used + free;
        let percent = if reachable > 0 {
            crate::format::round_1(used as f64 / reachable as f64 * 100.0)
        } else {
            0.0
        };
        UsageInfo {
            total,
            used,
            free,
            percent,
            total_formatted: format_bytes(total),
            used_formatted: format_bytes(used),
            free_formatted: format_bytes(free),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PartitionInfo {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    #[serde(flatten)]
    pub usage: UsageInfo,
}

#[derive(Clone, Debug, Serialize)]
pub struct DiskIoInfo {
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub read_bytes_formatted: String,
    pub write_bytes_formatted: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct DiskInfo {
    pub main_disk: UsageInfo,
    pub io: Option<DiskIoInfo>,
    pub partitions: Vec<PartitionInfo>,
}

#[derive(Clone, Debug, Serialize)]
pub struct NetworkTotals {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub bytes_sent_formatted: String,
    pub bytes_recv_formatted: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct InterfaceInfo {
    pub name: String,
    /// Link speed in Mbit/s, 0 when the driver does not report one.
    pub speed: u64,
    pub mtu: u64,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub bytes_sent_formatted: String,
    pub bytes_recv_formatted: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct NetworkInfo {
    pub total: NetworkTotals,
    pub interfaces: Vec<InterfaceInfo>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    pub username: Option<String>,
    pub cpu_percent: f32,
    pub memory_percent: f64,
    pub memory_rss: String,
    pub create_time: String,
}
