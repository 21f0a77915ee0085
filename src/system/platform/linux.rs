use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{DiskIoCounters, FsUsage, LinkStatus, PlatformExtensions, Uname, posix};

/// /proc/diskstats always counts in 512-byte sectors, whatever the device uses.
const SECTOR_SIZE: u64 = 512;

/// Administrative "up" bit of `dev->flags`. sysfs never exposes
/// `IFF_RUNNING`; the kernel derives it from the operational state instead.
const IFF_UP: u32 = 0x1;

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
        let contents = fs::read_to_string("/proc/diskstats").ok()?;
        // Only whole devices; partitions would count the same I/O twice.
        parse_diskstats(&contents, |name| {
            Path::new("/sys/block").join(name.replace('/', "!")).exists()
        })
    }

    fn link_status() -> Option<Vec<LinkStatus>> {
        let entries = fs::read_dir("/sys/class/net").ok()?;
        let mut links = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            // An interface can disappear while we walk the directory.
            if let Some(link) = read_link(&entry.path(), name) {
                links.push(link);
            }
        }
        links.sort_by(|a, b| a.name.cmp(&b.name));
        Some(links)
    }

    fn uname() -> Option<Uname> {
        posix::uname()
    }
}

fn read_link(dir: &Path, name: String) -> Option<LinkStatus> {
    let flags = fs::read_to_string(dir.join("flags")).ok()?;
    // Older kernels and some virtual drivers lack `operstate`; treat as unknown.
    let operstate = fs::read_to_string(dir.join("operstate")).unwrap_or_default();
    let mtu = read_number(&dir.join("mtu")).unwrap_or(0);
    // `speed` is EINVAL for virtual links and -1 when the carrier is down.
    let speed_mbps = fs::read_to_string(dir.join("speed"))
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|s| *s > 0)
        .map(|s| s as u64)
        .unwrap_or(0);
    Some(LinkStatus {
        name,
        is_up: link_is_up(&flags, &operstate)?,
        speed_mbps,
        mtu,
    })
}

/// Parse the hex `flags` attribute and combine it with `operstate` the way
/// `netif_oper_up` does: "unknown" counts as running (loopback, tun).
fn link_is_up(flags: &str, operstate: &str) -> Option<bool> {
    let flags = u32::from_str_radix(flags.trim().trim_start_matches("0x"), 16).ok()?;
    let running = matches!(operstate.trim(), "up" | "unknown" | "");
    Some(flags & IFF_UP != 0 && running)
}

fn read_number(path: &Path) -> Option<u64> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn parse_diskstats(
    contents: &str,
    is_whole_disk: impl Fn(&str) -> bool,
) -> Option<DiskIoCounters> {
    let mut totals = DiskIoCounters {
        read_bytes: 0,
        write_bytes: 0,
    };
    let mut seen = false;
    for line in contents.lines() {
        // major minor name reads merged sectors_read ms writes merged sectors_written ...
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }
        let name = fields[2];
        if !is_whole_disk(name) {
            continue;
        }
        let (Ok(sectors_read), Ok(sectors_written)) =
            (fields[5].parse::<u64>(), fields[9].parse::<u64>())
        else {
            continue;
        };
        totals.read_bytes += sectors_read * SECTOR_SIZE;
        totals.write_bytes += sectors_written * SECTOR_SIZE;
        seen = true;
    }
    seen.then_some(totals)
}
