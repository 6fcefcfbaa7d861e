//! # Scan Configuration
//!
//! [`ScanConfig`] is the raw value set the CLI (or any other front end) fills
//! in. [`ScanConfig::validate`] turns it into a [`ScanPlan`]; the engine only
//! ever runs plans, so malformed input is rejected before a single probe leaves
//! the machine.

use std::collections::BTreeSet;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::findings::Credential;
use crate::network::range::{NetworkRange, PortRange};

pub const DEFAULT_CONCURRENCY: usize = 100;
pub const DEFAULT_BANNER_MAX_LEN: usize = 60;
pub const DEFAULT_PORT_START: u32 = 1;
pub const DEFAULT_PORT_END: u32 = 1000;
pub const TELNET_PORT: u16 = 23;

/// Ports tried, concurrently, when a host is probed by TCP handshake.
pub const DEFAULT_HANDSHAKE_PORTS: &[u16] = &[80, 443, 22, 445];

/// Default credentials, tried in this order.
pub const DEFAULT_CREDENTIALS: &[(&str, &str)] = &[
    ("admin", "admin"),
    ("admin", "password"),
    ("admin", ""),
    ("root", "root"),
    ("user", "user"),
];

/// How reachability is established during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostProbeMethod {
    /// ICMP echo, falling back to a TCP handshake when ICMP is unavailable.
    #[default]
    Auto,
    Icmp,
    Handshake,
}

impl FromStr for HostProbeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(HostProbeMethod::Auto),
            "icmp" | "ping" => Ok(HostProbeMethod::Icmp),
            "tcp" | "handshake" => Ok(HostProbeMethod::Handshake),
            other => Err(format!("unknown host probe method: {other}")),
        }
    }
}

impl fmt::Display for HostProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostProbeMethod::Auto => "auto",
            HostProbeMethod::Icmp => "icmp",
            HostProbeMethod::Handshake => "handshake",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimeouts {
    /// Reachability check per host.
    pub host: Duration,
    /// TCP connect per port.
    pub connect: Duration,
    /// Banner read after a successful connect.
    pub read: Duration,
    /// Connect and read during a login attempt.
    pub login: Duration,
    /// Pause after each line written during a login attempt.
    pub login_settle: Duration,
    /// Reverse DNS query.
    pub dns: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            host: Duration::from_secs(1),
            connect: Duration::from_millis(500),
            read: Duration::from_secs(2),
            login: Duration::from_secs(3),
            login_settle: Duration::from_millis(500),
            dns: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// CIDR block (or single address) to sweep.
    pub target: String,
    pub port_start: u32,
    pub port_end: u32,
    pub host_concurrency: usize,
    /// Upper bound; the effective pool is never larger than the port range.
    pub port_concurrency: usize,
    pub timeouts: ProbeTimeouts,
    /// Banners longer than this many characters are cut and suffixed with `...`.
    pub banner_max_len: usize,
    pub credentials: Vec<Credential>,
    /// Open ports that trigger the weak-credential probe. Empty disables it.
    pub credential_ports: BTreeSet<u16>,
    pub host_probe: HostProbeMethod,
    pub handshake_ports: Vec<u16>,
    /// Disables reverse DNS for live hosts.
    pub no_dns: bool,
    /// Resolver for reverse lookups; the system resolver is used when unset.
    pub dns_server: Option<SocketAddr>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            port_start: DEFAULT_PORT_START,
            port_end: DEFAULT_PORT_END,
            host_concurrency: DEFAULT_CONCURRENCY,
            port_concurrency: DEFAULT_CONCURRENCY,
            timeouts: ProbeTimeouts::default(),
            banner_max_len: DEFAULT_BANNER_MAX_LEN,
            credentials: default_credentials(),
            credential_ports: BTreeSet::from([TELNET_PORT]),
            host_probe: HostProbeMethod::default(),
            handshake_ports: DEFAULT_HANDSHAKE_PORTS.to_vec(),
            no_dns: false,
            dns_server: None,
        }
    }
}

impl ScanConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn with_ports(mut self, start: u32, end: u32) -> Self {
        self.port_start = start;
        self.port_end = end;
        self
    }

    /// Checks every field and resolves the target into a [`ScanPlan`].
    pub fn validate(&self) -> Result<ScanPlan, ConfigError> {
        let range: NetworkRange = self.target.parse()?;
        let ports = PortRange::new(self.port_start, self.port_end)?;

        if self.host_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency { pool: "host" });
        }
        if self.port_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency { pool: "port" });
        }

        let t = &self.timeouts;
        for (name, value) in [
            ("host", t.host),
            ("connect", t.connect),
            ("read", t.read),
            ("login", t.login),
            ("dns", t.dns),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroTimeout(name));
            }
        }

        if !self.credential_ports.is_empty() && self.credentials.is_empty() {
            return Err(ConfigError::EmptyCredentialList);
        }
        if self.host_probe != HostProbeMethod::Icmp && self.handshake_ports.is_empty() {
            return Err(ConfigError::NoHandshakePorts);
        }
        for port in self.credential_ports.iter().chain(&self.handshake_ports) {
            if *port == 0 {
                return Err(ConfigError::InvalidPort(0));
            }
        }

        Ok(ScanPlan {
            range,
            ports,
            config: self.clone(),
        })
    }
}

/// A validated [`ScanConfig`].
#[derive(Debug, Clone)]
pub struct ScanPlan {
    pub range: NetworkRange,
    pub ports: PortRange,
    pub config: ScanConfig,
}

impl ScanPlan {
    /// Port pool size for one host: `min(port_concurrency, range size)`.
    pub fn port_workers(&self) -> usize {
        let range_len = usize::try_from(self.ports.len()).unwrap_or(usize::MAX);
        self.config.port_concurrency.min(range_len)
    }

    pub fn is_credential_port(&self, port: u16) -> bool {
        self.config.credential_ports.contains(&port)
    }
}

pub fn default_credentials() -> Vec<Credential> {
    DEFAULT_CREDENTIALS
        .iter()
        .map(|(user, pass)| Credential::new(*user, *pass))
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
