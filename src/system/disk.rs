use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use sysinfo::Disks;
use tracing::debug_span;

use super::platform::{self, DiskIoCounters, FsUsage};
use super::probe::{Probe, SkipReason, classify_io, gather};
use super::snapshot::{DiskInfo, DiskIoInfo, PartitionInfo, UsageInfo};
use crate::error::{CollectError, Result};
use crate::format::format_bytes;

const DOMAIN: &str = "disk";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MountEntry {
    pub device: String,
    pub mountpoint: PathBuf,
    pub fstype: String,
}

impl fmt::Display for MountEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mountpoint.display())
    }
}

/// Where the disk collector reads mounts, usage and I/O counters from.
pub trait DiskSource {
    fn root(&self) -> PathBuf;
    fn mounts(&self) -> Vec<MountEntry>;
    fn usage(&self, mountpoint: &Path) -> io::Result<FsUsage>;
    fn io_counters(&self) -> Option<DiskIoCounters>;
}

/// Mount table from sysinfo, usage and counters from the platform layer.
pub struct HostDisks {
    disks: Disks,
}

impl Default for HostDisks {
    fn default() -> Self {
        Self::new()
    }
}

impl HostDisks {
    pub fn new() -> Self {
        HostDisks {
            disks: Disks::new_with_refreshed_list(),
        }
    }
}

impl DiskSource for HostDisks {
    fn root(&self) -> PathBuf {
        platform::root_mount()
    }

    fn mounts(&self) -> Vec<MountEntry> {
        self.disks
            .iter()
            .map(|disk| MountEntry {
                device: disk.name().to_string_lossy().to_string(),
                mountpoint: disk.mount_point().to_path_buf(),
                fstype: disk.file_system().to_string_lossy().to_string(),
            })
            .collect()
    }

    fn usage(&self, mountpoint: &Path) -> io::Result<FsUsage> {
        platform::filesystem_usage(mountpoint)
    }

    fn io_counters(&self) -> Option<DiskIoCounters> {
        platform::disk_io_counters()
    }
}

/// Root usage, cumulative I/O and every mount whose usage could be read.
/// A mount that refuses the query is left out; the root filesystem failing
/// is not expected and aborts the capture.
pub fn collect_disk<D: DiskSource + ?Sized>(source: &D) -> Result<DiskInfo> {
    let _span = debug_span!("collector.disk").entered();

    let root = source.root();
    let main = source
        .usage(&root)
        .map_err(|e| CollectError::io(DOMAIN, e))?;

    let io = source.io_counters().map(|c| DiskIoInfo {
        read_bytes: c.read_bytes,
        write_bytes: c.write_bytes,
        read_bytes_formatted: format_bytes(c.read_bytes),
        write_bytes_formatted: format_bytes(c.write_bytes),
    });

    let partitions = gather(DOMAIN, source.mounts(), |mount| {
        probe_partition(source, mount)
    })?;

    Ok(DiskInfo {
        main_disk: UsageInfo::new(main.total, main.used, main.free),
        io,
        partitions,
    })
}

fn probe_partition<D: DiskSource + ?Sized>(source: &D, mount: &MountEntry) -> Probe<PartitionInfo> {
    match source.usage(&mount.mountpoint) {
        Ok(usage) => Probe::Found(PartitionInfo {
            device: mount.device.clone(),
            mountpoint: mount.mountpoint.to_string_lossy().to_string(),
            fstype: mount.fstype.clone(),
            usage: UsageInfo::new(usage.total, usage.used, usage.free),
        }),
        Err(e) if platform::is_unreachable_mount(&e) => Probe::Skipped(SkipReason::Unreachable),
        Err(e) => classify_io(DOMAIN, e),
    }
}
