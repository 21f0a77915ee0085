use sysinfo::{CpuRefreshKind, RefreshKind, System};

use super::platform;
use super::snapshot::SystemInfo;

/// Host identity. Fields the platform cannot report are left empty.
pub fn collect_host() -> SystemInfo {
    let sys =
        System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()));
    let processor = sys
        .cpus()
        .first()
        .map(|c| c.brand().trim().to_string())
        .unwrap_or_default();

    match platform::uname() {
        Some(uts) => SystemInfo {
            system: uts.sysname,
            node: uts.nodename,
            release: uts.release,
            version: uts.version,
            machine: uts.machine,
            processor,
        },
        None => SystemInfo {
            system: System::name().unwrap_or_default(),
            node: System::host_name().unwrap_or_default(),
            release: System::kernel_version().unwrap_or_default(),
            version: System::long_os_version().unwrap_or_default(),
            machine: std::env::consts::ARCH.to_string(),
            processor,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_reports_identity() {
        let info = collect_host();
        assert!(!info.system.is_empty());
        assert!(!info.machine.is_empty());
    }
}
