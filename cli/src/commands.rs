pub mod discover;
pub mod scan;

use std::collections::BTreeSet;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use netscout_common::config::{DEFAULT_CONCURRENCY, HostProbeMethod, ScanConfig, TELNET_PORT};
use netscout_common::network::range::{NetworkRange, PortRange};
use netscout_common::result::ScanResult;
use netscout_common::warn;
use netscout_core::ScanCoordinator;
use netscout_protocols::dns::DNS_PORT;
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::terminal::progress;

#[derive(Parser)]
#[command(name = "netscout")]
#[command(about = "LAN reconnaissance: host discovery, port and service survey, default-credential checks.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// More output (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Skip the banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find live hosts in a network
    #[command(alias = "d")]
    Discover {
        /// CIDR block or single address
        target: NetworkRange,
        #[command(flatten)]
        opts: ScanOptions,
    },
    /// Discover, then sweep ports and check default logins on every live host
    #[command(alias = "s")]
    Scan {
        /// CIDR block or single address
        target: NetworkRange,
        /// Port or inclusive range, e.g. `22` or `1-1024`
        #[arg(short, long)]
        ports: Option<PortRange>,
        #[command(flatten)]
        opts: ScanOptions,
    },
    /// Full port range (1-65535) against one host
    #[command(alias = "t")]
    Target {
        address: IpAddr,
        #[command(flatten)]
        opts: ScanOptions,
    },
}

/// Tuning shared by every subcommand.
#[derive(Args, Clone)]
pub struct ScanOptions {
    /// Concurrent host probes
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub host_concurrency: usize,

    /// Upper bound on concurrent port probes per host
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub port_concurrency: usize,

    /// Host reachability timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub host_timeout: u64,

    /// TCP connect timeout in milliseconds
    #[arg(long, default_value_t = 500)]
    pub connect_timeout: u64,

    /// Banner read timeout in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub read_timeout: u64,

    /// How reachability is tested: auto, icmp or handshake
    #[arg(long, default_value_t = HostProbeMethod::Auto)]
    pub probe: HostProbeMethod,

    /// Open ports that get the default-credential check; 21 enables FTP
    #[arg(long, value_delimiter = ',', default_values_t = [TELNET_PORT])]
    pub credential_ports: Vec<u16>,

    /// Do not check default credentials at all
    #[arg(long)]
    pub no_login: bool,

    /// Do not resolve hostnames
    #[arg(short = 'n', long)]
    pub no_dns: bool,

    /// DNS server for reverse lookups (defaults to the system resolver)
    #[arg(long)]
    pub dns_server: Option<IpAddr>,

    /// Write results as JSON; without a file name one is generated
    #[arg(short, long, num_args = 0..=1, value_name = "FILE")]
    pub output: Option<Option<PathBuf>>,
}

impl ScanOptions {
    pub fn to_config(&self, target: String, ports: PortRange) -> ScanConfig {
        let mut config = ScanConfig::new(target)
            .with_ports(u32::from(ports.start()), u32::from(ports.end()));

        config.host_concurrency = self.host_concurrency;
        config.port_concurrency = self.port_concurrency;
        config.timeouts.host = Duration::from_millis(self.host_timeout);
        config.timeouts.connect = Duration::from_millis(self.connect_timeout);
        config.timeouts.read = Duration::from_millis(self.read_timeout);
        config.host_probe = self.probe;
        config.credential_ports = if self.no_login {
            BTreeSet::new()
        } else {
            self.credential_ports.iter().copied().collect()
        };
        config.no_dns = self.no_dns;
        config.dns_server = self.dns_server.map(|ip| SocketAddr::new(ip, DNS_PORT));
        config
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Which part of the pipeline a command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    DiscoveryOnly,
    Full,
}

/// Runs `coordinator` with a progress bar attached and Ctrl-C wired to its
/// stop handle.
pub async fn drive(coordinator: ScanCoordinator, stage: Stage, kind: &'static str) -> ScanResult {
    let (tx, rx) = mpsc::unbounded_channel();
    let coordinator = coordinator.with_events(tx);

    let stop = coordinator.stop_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, waiting for in-flight probes to time out");
            stop.stop();
        }
    });

    let span = progress::scan_span(kind);
    let tracker = progress::track(span.clone(), rx);

    let result = match stage {
        Stage::DiscoveryOnly => coordinator.discover().instrument(span).await,
        Stage::Full => coordinator.run().instrument(span).await,
    };
    drop(coordinator);

    let _ = tracker.await;
    interrupt.abort();
    result
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
