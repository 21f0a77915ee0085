use sysinfo::Networks;
use tracing::debug_span;

use super::platform::{self, LinkStatus};
use super::probe::{Probe, SkipReason, gather};
use super::snapshot::{InterfaceInfo, NetworkInfo, NetworkTotals};
use crate::error::Result;
use crate::format::format_bytes;

const DOMAIN: &str = "network";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
}

pub trait NetworkSource {
    /// Cumulative counters summed over every interface.
    fn totals(&self) -> NetCounters;
    fn links(&self) -> Vec<LinkStatus>;
    /// `None` when the interface has no counters right now, e.g. it was
    /// created or removed after the counters were read.
    fn counters(&self, name: &str) -> Option<NetCounters>;
}

pub struct HostNetwork {
    networks: Networks,
    links: Vec<LinkStatus>,
}

impl Default for HostNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl HostNetwork {
    pub fn new() -> Self {
        let networks = Networks::new_with_refreshed_list();
        let links = platform::link_status().unwrap_or_else(|| {
            // No link table: every interface sysinfo reports counts as up.
            let mut links: Vec<LinkStatus> = networks
                .list()
                .iter()
                .map(|(name, data)| LinkStatus {
                    name: name.clone(),
                    is_up: true,
                    speed_mbps: 0,
                    mtu: data.mtu(),
                })
                .collect();
            links.sort_by(|a, b| a.name.cmp(&b.name));
            links
        });
        HostNetwork { networks, links }
    }
}

impl NetworkSource for HostNetwork {
    fn totals(&self) -> NetCounters {
        self.networks
            .list()
            .values()
            .fold(NetCounters::default(), |acc, data| NetCounters {
                bytes_sent: acc.bytes_sent + data.total_transmitted(),
                bytes_recv: acc.bytes_recv + data.total_received(),
                packets_sent: acc.packets_sent + data.total_packets_transmitted(),
                packets_recv: acc.packets_recv + data.total_packets_received(),
            })
    }

    fn links(&self) -> Vec<LinkStatus> {
        self.links.clone()
    }

    fn counters(&self, name: &str) -> Option<NetCounters> {
        self.networks.list().get(name).map(|data| NetCounters {
            bytes_sent: data.total_transmitted(),
            bytes_recv: data.total_received(),
            packets_sent: data.total_packets_transmitted(),
            packets_recv: data.total_packets_received(),
        })
    }
}

pub fn collect_network<N: NetworkSource + ?Sized>(source: &N) -> Result<NetworkInfo> {
    let _span = debug_span!("collector.network").entered();

    let totals = source.totals();
    let interfaces = gather(DOMAIN, source.links(), |link| {
        if !link.is_up {
            return Probe::Skipped(SkipReason::Down);
        }
        Probe::from(source.counters(&link.name)).map(|c| InterfaceInfo {
            name: link.name.clone(),
            speed: link.speed_mbps,
            mtu: link.mtu,
            bytes_sent: c.bytes_sent,
            bytes_recv: c.bytes_recv,
            bytes_sent_formatted: format_bytes(c.bytes_sent),
            bytes_recv_formatted: format_bytes(c.bytes_recv),
        })
    })?;

    Ok(NetworkInfo {
        total: NetworkTotals {
            bytes_sent: totals.bytes_sent,
            bytes_recv: totals.bytes_recv,
            packets_sent: totals.packets_sent,
            packets_recv: totals.packets_recv,
            bytes_sent_formatted: format_bytes(totals.bytes_sent),
            bytes_recv_formatted: format_bytes(totals.bytes_recv),
        },
        interfaces,
    })
}
