//! # Scan Coordinator
//!
//! Sequences one run: discovery over the target range, then, host by host, a
//! bounded port sweep followed by the weak-credential probe on every eligible
//! open port.
//!
//! Statistics are folded in here and nowhere else: sweeps hand back their own
//! reports and the coordinator merges them between stages, so no counter is
//! ever shared with a worker.
//!
//! Every probe implementation can be swapped out, which is how the tests drive
//! the coordinator against a simulated network.

use std::sync::Arc;
use std::time::Instant;

use netscout_common::config::{HostProbeMethod, ScanConfig, ScanPlan};
use netscout_common::error::ConfigError;
use netscout_common::result::ScanResult;
use netscout_common::stats::ScanStatistics;
use netscout_common::{info, success, warn};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::credentials::{self, LineLogin};
use crate::discovery::{DiscoveryReport, DiscoverySweep};
use crate::events::{EventSink, ScanEvent};
use crate::network::icmp::{FallbackProbe, PingProbe};
use crate::network::tcp::{HandshakeProbe, TcpPortProbe};
use crate::pool::StopHandle;
use crate::ports::PortSweep;
use crate::probe::{HostProber, LoginProber, NameResolver, PortProber};

pub mod resolver;

use resolver::PtrResolver;

pub struct ScanCoordinator {
    plan: ScanPlan,
    host_prober: Arc<dyn HostProber>,
    port_prober: Arc<dyn PortProber>,
    login_prober: Arc<dyn LoginProber>,
    resolver: Option<Arc<dyn NameResolver>>,
    stop: StopHandle,
    events: EventSink,
}

impl ScanCoordinator {
    /// Validates `config` and wires up the real network probes.
    ///
    /// Nothing is sent until [`ScanCoordinator::run`] or
    /// [`ScanCoordinator::discover`] is awaited.
    pub fn new(config: &ScanConfig) -> Result<Self, ConfigError> {
        let plan = config.validate()?;
        let timeouts = plan.config.timeouts;

        let host_prober = build_host_prober(&plan.config);
        let port_prober: Arc<dyn PortProber> = Arc::new(TcpPortProbe::new(
            timeouts.connect,
            timeouts.read,
            plan.config.banner_max_len,
        ));
        let login_prober: Arc<dyn LoginProber> =
            Arc::new(LineLogin::new(timeouts.login, timeouts.login_settle));
        let resolver = build_resolver(&plan.config);

        Ok(Self {
            plan,
            host_prober,
            port_prober,
            login_prober,
            resolver,
            stop: StopHandle::new(),
            events: EventSink::default(),
        })
    }

    pub fn with_host_prober(mut self, prober: Arc<dyn HostProber>) -> Self {
        self.host_prober = prober;
        self
    }

    pub fn with_port_prober(mut self, prober: Arc<dyn PortProber>) -> Self {
        self.port_prober = prober;
        self
    }

    pub fn with_login_prober(mut self, prober: Arc<dyn LoginProber>) -> Self {
        self.login_prober = prober;
        self
    }

    pub fn with_resolver(mut self, resolver: Option<Arc<dyn NameResolver>>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Progress notifications go to `tx`. Purely observational.
    pub fn with_events(mut self, tx: UnboundedSender<ScanEvent>) -> Self {
        self.events = EventSink::new(tx);
        self
    }

    /// Handle for stopping the run from elsewhere (a Ctrl-C handler, say).
    /// Work already in flight finishes; nothing new is dispatched.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn plan(&self) -> &ScanPlan {
        &self.plan
    }

    /// Discovery only: every probed host, no port sweep.
    pub async fn discover(&self) -> ScanResult {
        let started = Instant::now();
        let mut stats = ScanStatistics::default();

        let discovery = self.sweep_hosts().await;
        stats.record_discovery(discovery.tally.attempted, discovery.tally.hits);

        self.events.emit(ScanEvent::Finished);
        ScanResult {
            host_results: discovery.hosts,
            cancelled: self.stop.is_stopped(),
            statistics: stats.finish(started.elapsed()),
            ..ScanResult::default()
        }
    }

    /// The full pipeline. Always returns a result, even when every probe
    /// failed or the run was stopped early.
    pub async fn run(&self) -> ScanResult {
        let started = Instant::now();
        let mut stats = ScanStatistics::default();
        let mut result = ScanResult::default();

        let discovery = self.sweep_hosts().await;
        stats.record_discovery(discovery.tally.attempted, discovery.tally.hits);
        let live: Vec<_> = discovery.live_hosts().collect();
        info!(
            "{} of {} hosts alive in {}",
            live.len(),
            discovery.tally.attempted,
            self.plan.range
        );

        let port_sweep = PortSweep::new(Arc::clone(&self.port_prober), self.plan.port_workers())
            .with_stop(self.stop.clone())
            .with_events(self.events.clone());
        let requested_ports = self.plan.ports.len();

        for addr in live {
            if self.stop.is_stopped() {
                break;
            }

            let report = port_sweep.run(addr, self.plan.ports).await;
            stats.record_ports(requested_ports, report.findings.len() as u64);
            if report.attempted < requested_ports {
                debug!(
                    "{addr}: {} of {requested_ports} ports attempted before stop",
                    report.attempted
                );
            }

            for finding in &report.findings {
                if !self.plan.is_credential_port(finding.port) || self.stop.is_stopped() {
                    continue;
                }
                let hit = credentials::probe_credentials(
                    self.login_prober.as_ref(),
                    addr,
                    finding.port,
                    &self.plan.config.credentials,
                    &self.stop,
                    &self.events,
                )
                .await;
                if let Some(hit) = hit {
                    warn!(
                        "{addr}:{} accepts default credentials {}:{}",
                        hit.port, hit.username, hit.password
                    );
                    stats.record_vulnerability();
                    result.credential_findings.push(hit);
                }
            }

            result.port_findings.insert(addr, report.findings);
        }

        result.host_results = discovery.hosts;
        result.cancelled = self.stop.is_stopped();
        result.statistics = stats.finish(started.elapsed());
        self.events.emit(ScanEvent::Finished);

        if result.cancelled {
            warn!("scan stopped early, results are partial");
        } else {
            success!(
                "scan complete: {} open ports across {} live hosts",
                result.statistics.ports_open,
                result.statistics.hosts_alive
            );
        }
        result
    }

    async fn sweep_hosts(&self) -> DiscoveryReport {
        DiscoverySweep::new(Arc::clone(&self.host_prober), self.plan.config.host_concurrency)
            .with_resolver(self.resolver.clone())
            .with_stop(self.stop.clone())
            .with_events(self.events.clone())
            .run(&self.plan.range)
            .await
    }
}

/// Validates `config` and runs the full pipeline with the real network probes.
pub async fn run_scan(config: &ScanConfig) -> Result<ScanResult, ConfigError> {
    let coordinator = ScanCoordinator::new(config)?;
    Ok(coordinator.run().await)
}

fn build_host_prober(config: &ScanConfig) -> Arc<dyn HostProber> {
    let timeout = config.timeouts.host;
    let handshake = HandshakeProbe::new(config.handshake_ports.clone(), timeout);
    match config.host_probe {
        HostProbeMethod::Icmp => Arc::new(PingProbe::new(timeout)),
        HostProbeMethod::Handshake => Arc::new(handshake),
        HostProbeMethod::Auto => Arc::new(FallbackProbe::new(PingProbe::new(timeout), handshake)),
    }
}

fn build_resolver(config: &ScanConfig) -> Option<Arc<dyn NameResolver>> {
    if config.no_dns {
        return None;
    }
    let resolver = match config.dns_server {
        Some(server) => PtrResolver::new(server, config.timeouts.dns),
        None => match PtrResolver::from_system(config.timeouts.dns) {
            Ok(resolver) => resolver,
            Err(e) => {
                warn!("reverse DNS disabled: {e:#}");
                return None;
            }
        },
    };
    debug!("reverse DNS through {}", resolver.server());
    Some(Arc::new(resolver))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
