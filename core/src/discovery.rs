//! # Discovery Sweep
//!
//! Probes every usable address of a [`NetworkRange`] through a bounded
//! [`WorkerPool`] and returns one [`HostResult`] per address probed.
//!
//! Unreachable addresses are kept in the output for auditing; callers pick the
//! live subset with [`DiscoveryReport::live_hosts`]. Results are sorted by
//! address after collection, so worker completion order never shows.

use std::net::IpAddr;
use std::sync::Arc;

use netscout_common::network::host::HostResult;
use netscout_common::network::range::NetworkRange;
use netscout_common::stats::Tally;
use tracing::{debug, error};

use crate::events::{EventSink, ScanEvent};
use crate::pool::{StopHandle, WorkerPool};
use crate::probe::{HostProber, NameResolver};

#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Every address that was probed, ascending.
    pub hosts: Vec<HostResult>,
    /// `attempted` is the number of addresses probed, `hits` the live ones.
    pub tally: Tally,
}

impl DiscoveryReport {
    pub fn live_hosts(&self) -> impl Iterator<Item = IpAddr> + '_ {
        self.hosts
            .iter()
            .filter(|host| host.reachable)
            .map(|host| host.address)
    }
}

pub struct DiscoverySweep {
    prober: Arc<dyn HostProber>,
    resolver: Option<Arc<dyn NameResolver>>,
    concurrency: usize,
    stop: StopHandle,
    events: EventSink,
}

impl DiscoverySweep {
    pub fn new(prober: Arc<dyn HostProber>, concurrency: usize) -> Self {
        Self {
            prober,
            resolver: None,
            concurrency,
            stop: StopHandle::default(),
            events: EventSink::default(),
        }
    }

    /// Live hosts are looked up by reverse DNS inside the same worker slot.
    pub fn with_resolver(mut self, resolver: Option<Arc<dyn NameResolver>>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_stop(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub async fn run(&self, range: &NetworkRange) -> DiscoveryReport {
        let total = u64::try_from(range.host_count()).unwrap_or(u64::MAX);
        self.events.emit(ScanEvent::DiscoveryStarted { hosts: total });
        debug!("discovering {total} addresses in {range}");

        let prober = Arc::clone(&self.prober);
        let resolver = self.resolver.clone();
        let events = self.events.clone();

        let pool = WorkerPool::new(self.concurrency, self.stop.clone());
        let report = pool
            .run(range.hosts(), move |addr: IpAddr| {
                let prober = Arc::clone(&prober);
                let resolver = resolver.clone();
                let events = events.clone();
                async move {
                    let reachable = prober.probe(addr).await.is_reachable();
                    events.emit(ScanEvent::HostProbed { addr, reachable });
                    if !reachable {
                        return HostResult::unreachable(addr);
                    }

                    let name = match &resolver {
                        Some(resolver) => resolver.resolve(addr).await,
                        None => None,
                    };
                    HostResult::reachable(addr).with_name(name)
                }
            })
            .await;

        if report.lost > 0 {
            error!("{} host probe(s) crashed and were dropped", report.lost);
        }

        let mut hosts = report.results;
        hosts.sort_by_key(|host| host.address);
        let tally: Tally = hosts.iter().map(|host| host.reachable).collect();

        DiscoveryReport { hosts, tally }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
