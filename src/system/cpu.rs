use std::thread;
use std::time::Duration;

use sysinfo::{CpuRefreshKind, RefreshKind, System};
use tracing::debug_span;

use super::snapshot::{CpuInfo, Reading};
use crate::format::round_1;

/// Busy percentages over one blocking `interval`. Aggregate and per-core
/// figures come from the same pair of reads, so they describe the same window.
pub fn collect_cpu(interval: Duration) -> CpuInfo {
    let _span =
        debug_span!("collector.cpu", interval_ms = interval.as_millis() as u64).entered();

    let mut sys =
        System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::everything()));
    thread::sleep(interval);
    sys.refresh_cpu_specifics(CpuRefreshKind::nothing().with_cpu_usage());

    let per_cpu: Vec<f32> = sys
        .cpus()
        .iter()
        .map(|c| round_1(c.cpu_usage() as f64) as f32)
        .collect();
    let frequencies: Vec<u64> = sys.cpus().iter().map(|c| c.frequency()).collect();

    CpuInfo {
        cpu_percent: round_1(sys.global_cpu_usage() as f64) as f32,
        cpu_count: per_cpu.len(),
        cpu_freq: Reading::from(mean_frequency(&frequencies)),
        per_cpu,
    }
}

/// Average of the cores that report a clock. Zero means "unknown" to sysinfo.
fn mean_frequency(mhz: &[u64]) -> Option<u64> {
    let known: Vec<u64> = mhz.iter().copied().filter(|f| *f > 0).collect();
    if known.is_empty() {
        return None;
    }
    Some(known.iter().sum::<u64>() / known.len() as u64)
}
