use sysinfo::System;

use super::snapshot::MemoryInfo;
use crate::format::{format_bytes, round_1};

pub fn collect_memory() -> MemoryInfo {
    let mut sys = System::new();
    sys.refresh_memory();
    memory_from_counters(sys.total_memory(), sys.available_memory(), sys.used_memory())
}

/// Percent follows the kernel's notion of what is reclaimable
/// (`total - available`), not `used / total`: page cache and buffers are
/// accounted differently per platform and `used` may exclude them.
pub fn memory_from_counters(total: u64, available: u64, used: u64) -> MemoryInfo {
    let available = available.min(total);
    let used = used.min(total);
    let percent = if total > 0 {
        round_1((total - available) as f64 / total as f64 * 100.0)
    } else {
        0.0
    };
    MemoryInfo {
        total,
        available,
        used,
        percent,
        total_formatted: format_bytes(total),
        available_formatted: format_bytes(available),
        used_formatted: format_bytes(used),
    }
}
