use std::collections::HashMap;
use std::fmt;
use std::thread;
use std::time::Duration;

use chrono::{Local, TimeZone};
use sysinfo::{
    Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, ThreadKind, UpdateKind,
    Users,
};
use tracing::debug_span;

use super::probe::{Probe, SkipReason, gather};
use super::snapshot::{ProcessSample, TIMESTAMP_FORMAT};
use crate::error::Result;
use crate::format::{format_bytes, round_1};

const DOMAIN: &str = "process";

pub const DEFAULT_TOP_N: usize = 10;

pub const UNKNOWN: &str = "Unknown";

/// What enumeration yields for one process, before ranking.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    pub username: Option<String>,
    pub cpu_percent: Option<f32>,
    pub memory_percent: Option<f64>,
    /// Seconds since the Unix epoch.
    pub start_time: Option<u64>,
}

impl fmt::Display for ProcessEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.pid, self.name)
    }
}

pub trait ProcessSource {
    /// Every visible process, in enumeration order.
    fn enumerate(&mut self) -> Vec<ProcessEntry>;

    /// Re-read resident memory for `pids`, index-aligned with the input.
    /// Processes that exited or turned into zombies since [`enumerate`]
    /// come back as skips.
    ///
    /// [`enumerate`]: ProcessSource::enumerate
    fn resident_memory(&mut self, pids: &[u32]) -> Vec<Probe<u64>>;
}

/// Process table read through sysinfo. CPU usage needs two reads, so
/// `enumerate` blocks for one `sample_interval`.
pub struct HostProcesses {
    sys: System,
    users: Users,
    sample_interval: Duration,
}

impl HostProcesses {
    pub fn new(sample_interval: Duration) -> Self {
        HostProcesses {
            sys: System::new(),
            users: Users::new_with_refreshed_list(),
            sample_interval,
        }
    }

    fn refresh_all(&mut self) {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_cpu()
                .with_memory()
                .with_user(UpdateKind::OnlyIfNotSet),
        );
    }
}

impl ProcessSource for HostProcesses {
    fn enumerate(&mut self) -> Vec<ProcessEntry> {
        self.sys.refresh_memory();
        self.refresh_all();
        thread::sleep(self.sample_interval);
        self.refresh_all();

        let total_memory = self.sys.total_memory();
        let mut entries: Vec<ProcessEntry> = self
            .sys
            .processes()
            .iter()
            // Linux lists threads next to their owning process.
            .filter(|(_, p)| !matches!(p.thread_kind(), Some(ThreadKind::Userland)))
            .map(|(pid, p)| {
                let username = p
                    .user_id()
                    .and_then(|uid| self.users.get_user_by_id(uid))
                    .map(|u| u.name().to_string());
                let memory_percent = (total_memory > 0)
                    .then(|| p.memory() as f64 / total_memory as f64 * 100.0);
                ProcessEntry {
                    pid: pid.as_u32(),
                    name: p.name().to_string_lossy().to_string(),
                    username,
                    cpu_percent: Some(p.cpu_usage()),
                    memory_percent,
                    start_time: Some(p.start_time()).filter(|t| *t > 0),
                }
            })
            .collect();
        entries.sort_by_key(|e| e.pid);
        entries
    }

    fn resident_memory(&mut self, pids: &[u32]) -> Vec<Probe<u64>> {
        let sys_pids: Vec<Pid> = pids.iter().map(|p| Pid::from_u32(*p)).collect();
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&sys_pids),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        sys_pids
            .iter()
            .map(|pid| match self.sys.process(*pid) {
                None => Probe::Skipped(SkipReason::Vanished),
                Some(p) if matches!(p.status(), ProcessStatus::Zombie | ProcessStatus::Dead) => {
                    Probe::Skipped(SkipReason::Zombie)
                }
                Some(p) => Probe::Found(p.memory()),
            })
            .collect()
    }
}

/// Stable sort by CPU, highest first; processes without a reading rank as 0.
pub fn rank_by_cpu(mut entries: Vec<ProcessEntry>, top_n: usize) -> Vec<ProcessEntry> {
    entries.sort_by(|a, b| {
        let a = a.cpu_percent.unwrap_or(0.0);
        let b = b.cpu_percent.unwrap_or(0.0);
        b.total_cmp(&a)
    });
    entries.truncate(top_n);
    entries
}

pub fn format_start_time(epoch_secs: Option<u64>) -> String {
    epoch_secs
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Top `top_n` processes by CPU. Whoever exits between the scan and the
/// memory read is left out, so the result can be shorter than `top_n`.
pub fn collect_processes<P: ProcessSource + ?Sized>(
    source: &mut P,
    top_n: usize,
) -> Result<Vec<ProcessSample>> {
    let _span = debug_span!("collector.processes", top_n).entered();

    let ranked = rank_by_cpu(source.enumerate(), top_n);
    let pids: Vec<u32> = ranked.iter().map(|e| e.pid).collect();
    let mut rss: HashMap<u32, Probe<u64>> = pids
        .iter()
        .copied()
        .zip(source.resident_memory(&pids))
        .collect();

    gather(DOMAIN, ranked, |entry| {
        rss.remove(&entry.pid)
            .unwrap_or(Probe::Skipped(SkipReason::Vanished))
            .map(|bytes| ProcessSample {
                pid: entry.pid,
                name: entry.name.clone(),
                username: entry.username.clone(),
                cpu_percent: entry.cpu_percent.unwrap_or(0.0),
                memory_percent: entry.memory_percent.map(round_1).unwrap_or(0.0),
                memory_rss: format_bytes(bytes),
                create_time: format_start_time(entry.start_time),
            })
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn entry(pid: u32, cpu: Option<f32>) -> ProcessEntry {
        ProcessEntry {
            pid,
            name: format!("proc{pid}"),
            username: Some("tester".to_string()),
            cpu_percent: cpu,
            memory_percent: Some(1.26),
            start_time: None,
        }
    }

    struct FakeProcesses {
        entries: Vec<ProcessEntry>,
        gone: Vec<u32>,
        zombies: Vec<u32>,
    }

    impl ProcessSource for FakeProcesses {
        fn enumerate(&mut self) -> Vec<ProcessEntry> {
            self.entries.clone()
        }

        fn resident_memory(&mut self, pids: &[u32]) -> Vec<Probe<u64>> {
            pids.iter()
                .map(|pid| {
                    if self.gone.contains(pid) {
                        Probe::Skipped(SkipReason::Vanished)
                    } else if self.zombies.contains(pid) {
                        Probe::Skipped(SkipReason::Zombie)
                    } else {
                        Probe::Found(u64::from(*pid) * 1024)
                    }
                })
                .collect()
        }
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let ranked = rank_by_cpu(
            vec![
                entry(1, Some(5.0)),
                entry(2, Some(50.0)),
                entry(3, None),
                entry(4, Some(5.0)),
                entry(5, Some(0.0)),
            ],
            10,
        );
        let pids: Vec<u32> = ranked.iter().map(|e| e.pid).collect();
        assert_eq!(pids, vec![2, 1, 4, 3, 5]);
    }

    #[test]
    fn ranking_truncates() {
        let entries = (1..=20).map(|pid| entry(pid, Some(pid as f32))).collect();
        let ranked = rank_by_cpu(entries, 3);
        let pids: Vec<u32> = ranked.iter().map(|e| e.pid).collect();
        assert_eq!(pids, vec![20, 19, 18]);
        assert!(rank_by_cpu(vec![entry(1, None)], 0).is_empty());
    }

    #[test]
    fn raced_processes_are_dropped() {
        let mut source = FakeProcesses {
            entries: vec![
                entry(10, Some(90.0)),
                entry(11, Some(80.0)),
                entry(12, Some(70.0)),
                entry(13, Some(60.0)),
            ],
            gone: vec![11],
            zombies: vec![13],
        };
        let samples = collect_processes(&mut source, 10).unwrap();
        let pids: Vec<u32> = samples.iter().map(|s| s.pid).collect();
        assert_eq!(pids, vec![10, 12]);
        assert_eq!(samples[0].memory_rss, "10.00 KB");
        assert_eq!(samples[0].memory_percent, 1.3);
        assert_eq!(samples[0].create_time, UNKNOWN);
    }

    #[test]
    fn start_time_formatting() {
        assert_eq!(format_start_time(None), UNKNOWN);
        assert_eq!(format_start_time(Some(u64::MAX)), UNKNOWN);
        let rendered = format_start_time(Some(1_700_000_000));
        assert_eq!(rendered.len(), "2023-11-14 22:13:20".len());
        assert!(rendered.starts_with("2023-11-1"));
    }

    #[test]
    fn host_processes_fill_top_n() {
        let mut source = HostProcesses::new(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        let samples = collect_processes(&mut source, 5).unwrap();
        assert!(!samples.is_empty());
        assert!(samples.len() <= 5);
        for pair in samples.windows(2) {
            assert!(pair[0].cpu_percent >= pair[1].cpu_percent);
        }
    }

    proptest! {
        #[test]
        fn ranking_properties(
            cpus in proptest::collection::vec(0.0f32..400.0, 0..64),
            top_n in 0usize..20
        ) {
            let entries: Vec<ProcessEntry> = cpus
                .iter()
                .enumerate()
                .map(|(i, c)| entry(i as u32, Some(*c)))
                .collect();
            let ranked = rank_by_cpu(entries, top_n);
            prop_assert_eq!(ranked.len(), top_n.min(cpus.len()));
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].cpu_percent >= pair[1].cpu_percent);
            }
            let mut sorted = cpus.clone();
            sorted.sort_by(|a, b| b.total_cmp(a));
            let top: Vec<f32> = ranked.iter().map(|e| e.cpu_percent.unwrap()).collect();
            prop_assert_eq!(top, sorted[..ranked.len()].to_vec());
        }
    }
}
