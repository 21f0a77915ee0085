use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiskIoCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Space on one filesystem, in bytes. `free` is what an unprivileged user
/// can still allocate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FsUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkStatus {
    pub name: String,
    pub is_up: bool,
    pub speed_mbps: u64,
    pub mtu: u64,
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Uname {
    pub sysname: String,
    pub nodename: String,
    pub release: String,
    pub version: String,
    pub machine: String,
}

pub trait PlatformExtensions {
    fn root_mount() -> PathBuf;
    fn filesystem_usage(path: &Path) -> io::Result<FsUsage>;
    /// Errors that mean "this mount cannot answer right now" rather than a bug.
    fn is_unreachable_mount(err: &io::Error) -> bool;
    fn disk_io_counters() -> Option<DiskIoCounters>;
    /// `None` when the platform has no link table to read.
    fn link_status() -> Option<Vec<LinkStatus>>;
    fn uname() -> Option<Uname>;
}

#[cfg(unix)]
mod posix;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn root_mount() -> PathBuf {
    platform_impl::Platform::root_mount()
}

pub fn filesystem_usage(path: &Path) -> io::Result<FsUsage> {
    platform_impl::Platform::filesystem_usage(path)
}

pub fn is_unreachable_mount(err: &io::Error) -> bool {
    platform_impl::Platform::is_unreachable_mount(err)
}

pub fn disk_io_counters() -> Option<DiskIoCounters> {
    platform_impl::Platform::disk_io_counters()
}

pub fn link_status() -> Option<Vec<LinkStatus>> {
    platform_impl::Platform::link_status()
}

pub fn uname() -> Option<Uname> {
    platform_impl::Platform::uname()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrappers_do_not_panic() {
        let _ = disk_io_counters();
        let _ = link_status();
        let _ = uname();
        let _ = is_unreachable_mount(&io::Error::other("x"));
    }

    #[test]
    fn root_mount_has_usage() {
        let usage = filesystem_usage(&root_mount()).expect("root filesystem usage");
        assert!(usage.total > 0);
        assert!(usage.used <= usage.total);
    }

    #[test]
    fn missing_path_is_an_io_error() {
        let err = filesystem_usage(Path::new("/definitely/not/mounted/here")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
