//! # Port Sweep
//!
//! One host, one inclusive port range, one bounded pool. Each port is probed
//! exactly once; open ports are classified on the spot and the findings are
//! sorted by port before they are returned.

use std::net::IpAddr;
use std::sync::Arc;

use netscout_common::findings::PortFinding;
use netscout_common::network::range::PortRange;
use tracing::{debug, error};

use crate::events::{EventSink, ScanEvent};
use crate::pool::{StopHandle, WorkerPool};
use crate::probe::{PortProber, PortState};
use crate::service;

#[derive(Debug, Default)]
pub struct PortReport {
    /// Open ports, ascending.
    pub findings: Vec<PortFinding>,
    /// Ports whose probe completed (open or not).
    pub attempted: u64,
}

pub struct PortSweep {
    prober: Arc<dyn PortProber>,
    workers: usize,
    stop: StopHandle,
    events: EventSink,
}

impl PortSweep {
    /// `workers` is an upper bound; the pool never exceeds the range size.
    pub fn new(prober: Arc<dyn PortProber>, workers: usize) -> Self {
        Self {
            prober,
            workers,
            stop: StopHandle::default(),
            events: EventSink::default(),
        }
    }

    pub fn with_stop(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub async fn run(&self, addr: IpAddr, ports: PortRange) -> PortReport {
        self.events.emit(ScanEvent::PortSweepStarted {
            addr,
            ports: ports.len(),
        });

        let pool_size = usize::try_from(ports.len())
            .unwrap_or(usize::MAX)
            .min(self.workers);
        debug!("sweeping {addr} ports {ports} with {pool_size} workers");

        let prober = Arc::clone(&self.prober);
        let events = self.events.clone();

        let report = WorkerPool::new(pool_size, self.stop.clone())
            .run(ports.iter(), move |port: u16| {
                let prober = Arc::clone(&prober);
                let events = events.clone();
                async move {
                    let state = prober.probe(addr, port).await;
                    events.emit(ScanEvent::PortProbed {
                        addr,
                        port,
                        open: state.is_open(),
                    });
                    match state {
                        PortState::Open { banner } => Some(service::finding(port, banner)),
                        PortState::Closed(_) => None,
                    }
                }
            })
            .await;

        if report.lost > 0 {
            error!("{} port probe(s) on {addr} crashed and were dropped", report.lost);
        }

        let attempted = report.results.len() as u64;
        let mut findings: Vec<PortFinding> = report.results.into_iter().flatten().collect();
        findings.sort_by_key(|finding| finding.port);

        PortReport {
            findings,
            attempted,
        }
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
