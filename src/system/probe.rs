//! Tagged per-item results.
//!
//! Collectors walk sequences of OS objects (mounts, interfaces, processes)
//! where single items can legitimately vanish or be unreadable. Each attempt
//! produces a [`Probe`]: the value, a known reason to skip the item, or an
//! unexpected failure that must abort the capture.

use std::fmt;
use std::io;

use tracing::debug;

use crate::error::{CollectError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The OS refused access (EACCES/EPERM, protected process).
    AccessDenied,
    /// The object disappeared between enumeration and detail read.
    Vanished,
    /// The process has exited but not yet been reaped.
    Zombie,
    /// A mount that exists but cannot answer right now (stale NFS, dead FUSE).
    Unreachable,
    /// Companion data was not published for this item (interface counters).
    Missing,
    /// Interface is administratively or operationally down.
    Down,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::AccessDenied => "access denied",
            SkipReason::Vanished => "no longer exists",
            SkipReason::Zombie => "zombie",
            SkipReason::Unreachable => "unreachable",
            SkipReason::Missing => "counters missing",
            SkipReason::Down => "down",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
pub enum Probe<T> {
    Found(T),
    Skipped(SkipReason),
    Failed(CollectError),
}

impl<T> Probe<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Probe<U> {
        match self {
            Probe::Found(v) => Probe::Found(f(v)),
            Probe::Skipped(r) => Probe::Skipped(r),
            Probe::Failed(e) => Probe::Failed(e),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Probe::Found(_))
    }
}

impl<T> From<Option<T>> for Probe<T> {
    /// `None` means the companion record was absent.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Probe::Found(v),
            None => Probe::Skipped(SkipReason::Missing),
        }
    }
}

/// Classify an I/O error raised while reading one item. Only the kinds a
/// healthy host produces routinely map to a skip.
pub fn classify_io<T>(domain: &'static str, err: io::Error) -> Probe<T> {
    match err.kind() {
        io::ErrorKind::PermissionDenied => Probe::Skipped(SkipReason::AccessDenied),
        io::ErrorKind::NotFound => Probe::Skipped(SkipReason::Vanished),
        io::ErrorKind::TimedOut => Probe::Skipped(SkipReason::Unreachable),
        _ => Probe::Failed(CollectError::io(domain, err)),
    }
}

/// Attempt every item, keep the found values in order, drop known skips and
/// stop at the first unexpected failure.
pub fn gather<I, T, F>(domain: &'static str, items: I, mut attempt: F) -> Result<Vec<T>>
where
    I: IntoIterator,
    I::Item: fmt::Display,
    F: FnMut(&I::Item) -> Probe<T>,
{
    let iter = items.into_iter();
    let mut out = Vec::with_capacity(iter.size_hint().0);
    for item in iter {
        match attempt(&item) {
            Probe::Found(v) => out.push(v),
            Probe::Skipped(reason) => {
                debug!(domain, item = %item, %reason, "skipping item");
            }
            Probe::Failed(err) => return Err(err),
        }
    }
    Ok(out)
}
