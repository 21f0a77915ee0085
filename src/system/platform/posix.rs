use std::ffi::CString;
use std::io;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use super::{FsUsage, Uname};

#[allow(clippy::unnecessary_cast)]
pub(super) fn statvfs_usage(path: &Path) -> io::Result<FsUsage> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut stat = MaybeUninit::<libc::statvfs>::uninit();
    // SAFETY: `c_path` is NUL-terminated and `stat` is sized for statvfs.
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: statvfs returned 0, so the struct is initialized.
    let stat = unsafe { stat.assume_init() };

    let frsize = stat.f_frsize as u64;
    let blocks = stat.f_blocks as u64;
    let bfree = stat.f_bfree as u64;
    let bavail = stat.f_bavail as u64;
    Ok(FsUsage {
        total: blocks * frsize,
        used: blocks.saturating_sub(bfree) * frsize,
        free: bavail * frsize,
    })
}

pub(super) fn is_unreachable_mount(err: &io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(libc::ESTALE | libc::ENOTCONN | libc::EHOSTDOWN | libc::ENODEV)
    )
}

pub(super) fn uname() -> Option<Uname> {
    let mut buf = MaybeUninit::<libc::utsname>::zeroed();
    // SAFETY: `buf` points to a zeroed utsname that uname fills in place.
    let rc = unsafe { libc::uname(buf.as_mut_ptr()) };
    if rc != 0 {
        return None;
    }
    // SAFETY: uname returned 0 and the buffer started zeroed.
    let buf = unsafe { buf.assume_init() };
    Some(Uname {
        sysname: c_field(&buf.sysname),
        nodename: c_field(&buf.nodename),
        release: c_field(&buf.release),
        version: c_field(&buf.version),
        machine: c_field(&buf.machine),
    })
}

fn c_field(raw: &[libc::c_char]) -> String {
    let bytes: Vec<u8> = raw
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uname_reports_kernel() {
        let info = uname().expect("uname");
        assert!(!info.sysname.is_empty());
        assert!(!info.release.is_empty());
    }

    #[test]
    fn stale_handles_are_unreachable() {
        assert!(is_unreachable_mount(&io::Error::from_raw_os_error(libc::ESTALE)));
        assert!(!is_unreachable_mount(&io::Error::from_raw_os_error(libc::EINVAL)));
    }
}
