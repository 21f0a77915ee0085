use std::io;
use std::path::{Path, PathBuf};

use super::{DiskIoCounters, FsUsage, LinkStatus, PlatformExtensions, Uname, posix};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn root_mount() -> PathBuf {
        PathBuf::from("/")
    }

    fn filesystem_usage(path: &Path) -> io::Result<FsUsage> {
        posix::statvfs_usage(path)
    }

    fn is_unreachable_mount(err: &io::Error) -> bool {
        posix::is_unreachable_mount(err)
    }

    fn disk_io_counters() -> Option<DiskIoCounters> {
        // Block device statistics live behind IOKit; not exposed here.
        None
    }

    fn link_status() -> Option<Vec<LinkStatus>> {
        None
    }

    fn uname() -> Option<Uname> {
        posix::uname()
    }
}
