use std::io;
use std::path::{Path, PathBuf};

use sysinfo::Disks;

use super::{DiskIoCounters, FsUsage, LinkStatus, PlatformExtensions, Uname};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn root_mount() -> PathBuf {
        let drive = std::env::var("SystemDrive").unwrap_or_else(|_| "C:".to_string());
        PathBuf::from(format!("{drive}\\"))
    }

    fn filesystem_usage(path: &Path) -> io::Result<FsUsage> {
        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .iter()
            .find(|d| d.mount_point() == path)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        let total = disk.total_space();
        let free = disk.available_space();
        Ok(FsUsage {
            total,
            used: total.saturating_sub(free),
            free,
        })
    }

    fn is_unreachable_mount(err: &io::Error) -> bool {
        // ERROR_NOT_READY: removable drive with no media.
        err.raw_os_error() == Some(21)
    }

    fn disk_io_counters() -> Option<DiskIoCounters> {
        None
    }

    fn link_status() -> Option<Vec<LinkStatus>> {
        None
    }

    fn uname() -> Option<Uname> {
        None
    }
}
