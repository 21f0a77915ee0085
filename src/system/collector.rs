use std::thread;
use std::time::Duration;

use chrono::Local;
use tracing::{debug, debug_span};

use super::cpu::collect_cpu;
use super::disk::{DiskSource, HostDisks, collect_disk};
use super::host::collect_host;
use super::memory::collect_memory;
use super::network::{HostNetwork, NetworkSource, collect_network};
use super::process::{DEFAULT_TOP_N, HostProcesses, ProcessSource, collect_processes};
use super::snapshot::Snapshot;
use crate::error::{CollectError, Result};

pub const DEFAULT_CPU_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectorConfig {
    pub top_n: usize,
    /// Window for CPU busy percentages. Raised to the OS minimum if lower.
    pub cpu_interval: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig {
            top_n: DEFAULT_TOP_N,
            cpu_interval: DEFAULT_CPU_INTERVAL,
        }
    }
}

impl CollectorConfig {
    pub fn effective_cpu_interval(&self) -> Duration {
        self.cpu_interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL)
    }
}

/// Builds snapshots. Holds only configuration: every capture opens its own
/// OS handles, so one `Collector` can serve concurrent captures.
#[derive(Clone, Debug, Default)]
pub struct Collector {
    config: CollectorConfig,
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Self {
        Collector { config }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// One fresh snapshot of the local host. Blocks for roughly one CPU
    /// sampling interval.
    pub fn capture(&self) -> Result<Snapshot> {
        let interval = self.config.effective_cpu_interval();
        let disks = HostDisks::new();
        let network = HostNetwork::new();
        let mut processes = HostProcesses::new(interval);
        self.capture_with(&disks, &network, &mut processes)
    }

    /// Capture using the given disk, network and process sources. CPU,
    /// memory and host identity are always read from the local OS.
    pub fn capture_with<D, N, P>(
        &self,
        disks: &D,
        network: &N,
        processes: &mut P,
    ) -> Result<Snapshot>
    where
        D: DiskSource + ?Sized,
        N: NetworkSource + ?Sized,
        P: ProcessSource + Send + ?Sized,
    {
        let _span = debug_span!("collector.capture").entered();
        let timestamp = Local::now();
        let interval = self.config.effective_cpu_interval();
        let top_n = self.config.top_n;

        // The two blocking samplers run side by side; everything else is a
        // single quick read on this thread.
        let snapshot = thread::scope(|scope| {
            let cpu_task = scope.spawn(move || collect_cpu(interval));
            let process_task = scope.spawn(move || collect_processes(processes, top_n));

            let system = collect_host();
            let memory = collect_memory();
            let disk = collect_disk(disks);
            let network = collect_network(network);

            let cpu = cpu_task
                .join()
                .map_err(|_| CollectError::Join("cpu sampler panicked".to_string()))?;
            let processes = process_task
                .join()
                .map_err(|_| CollectError::Join("process sampler panicked".to_string()))??;

            Ok::<_, CollectError>(Snapshot {
                timestamp,
                system,
                cpu,
                memory,
                disk: disk?,
                network: network?,
                processes,
            })
        })?;

        debug!(
            processes = snapshot.processes.len(),
            partitions = snapshot.disk.partitions.len(),
            interfaces = snapshot.network.interfaces.len(),
            "snapshot captured"
        );
        Ok(snapshot)
    }
}
