//! The leaf-probe **abstractions**.
//!
//! Every network operation the sweeps perform goes through one of these traits.
//! Implementations must never panic or return an error for ordinary network
//! trouble: timeouts, refusals and unreachable hosts are expressed in the
//! outcome types below, so the negative path is part of each signature.
//!
//! The concrete probes live in [`crate::network`] and [`crate::credentials`];
//! tests substitute simulated ones.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use netscout_common::error::ProbeFailure;
use netscout_common::findings::Credential;

/// Result of a single reachability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Reachable { rtt: Duration },
    Unreachable(ProbeFailure),
}

impl Reachability {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Reachability::Reachable { .. })
    }
}

/// Result of a single connect-and-banner attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortState {
    Open { banner: Option<String> },
    Closed(ProbeFailure),
}

impl PortState {
    pub fn is_open(&self) -> bool {
        matches!(self, PortState::Open { .. })
    }
}

/// Result of one username/password attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginAttempt {
    /// No failure marker in the server's reply.
    Accepted,
    Rejected,
    /// The dialogue could not be completed.
    Failed(ProbeFailure),
}

#[async_trait]
pub trait HostProber: Send + Sync {
    async fn probe(&self, addr: IpAddr) -> Reachability;
}

#[async_trait]
pub trait PortProber: Send + Sync {
    async fn probe(&self, addr: IpAddr, port: u16) -> PortState;
}

#[async_trait]
pub trait LoginProber: Send + Sync {
    async fn attempt(&self, addr: IpAddr, port: u16, credential: &Credential) -> LoginAttempt;
}

/// Reverse name lookup for live hosts. `None` on any failure.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve(&self, addr: IpAddr) -> Option<String>;
}
