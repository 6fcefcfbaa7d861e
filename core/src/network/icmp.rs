//! ICMP echo reachability through the system `ping` binary.
//!
//! Raw ICMP sockets need privileges; the setuid (or capability-enabled)
//! `ping` shipped by the OS does not. When `ping` is missing or refuses to
//! run, [`FallbackProbe`] switches to a TCP handshake for the rest of the run.

use std::net::IpAddr;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use netscout_common::error::ProbeFailure;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{trace, warn};

use crate::probe::{HostProber, Reachability};

/// Extra time granted to the child process beyond its own reply deadline.
const PROCESS_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct PingProbe {
    timeout: Duration,
}

impl PingProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn command(&self, addr: IpAddr) -> Command {
        let mut cmd = Command::new(ping_program(addr));
        cmd.args(ping_args(addr, self.timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl HostProber for PingProbe {
    async fn probe(&self, addr: IpAddr) -> Reachability {
        let started = Instant::now();
        let mut child = match self.command(addr).spawn() {
            Ok(child) => child,
            Err(e) => return Reachability::Unreachable(ProbeFailure::from(&e)),
        };

        match timeout(self.timeout + PROCESS_GRACE, child.wait()).await {
            Ok(Ok(status)) if status.success() => Reachability::Reachable {
                rtt: started.elapsed(),
            },
            Ok(Ok(status)) => {
                trace!("ping {addr} exited with {status}");
                Reachability::Unreachable(failure_from_exit_code(status.code()))
            }
            Ok(Err(e)) => Reachability::Unreachable(ProbeFailure::from(&e)),
            // Dropping `child` kills it
            Err(_elapsed) => Reachability::Unreachable(ProbeFailure::Timeout),
        }
    }
}

/// iputils and BSD ping both exit 1 for "no reply" and 2 (or more) when they
/// could not send at all.
fn failure_from_exit_code(code: Option<i32>) -> ProbeFailure {
    match code {
        Some(1) => ProbeFailure::Timeout,
        Some(_) => ProbeFailure::Unsupported,
        None => ProbeFailure::Other,
    }
}

#[cfg(target_os = "macos")]
fn ping_program(addr: IpAddr) -> &'static str {
    if addr.is_ipv6() { "ping6" } else { "ping" }
}

#[cfg(not(target_os = "macos"))]
fn ping_program(_addr: IpAddr) -> &'static str {
    "ping"
}

#[cfg(target_os = "windows")]
fn ping_args(addr: IpAddr, timeout: Duration) -> Vec<String> {
    let millis = timeout.as_millis().max(1).to_string();
    vec!["-n".into(), "1".into(), "-w".into(), millis, addr.to_string()]
}

#[cfg(target_os = "macos")]
fn ping_args(addr: IpAddr, timeout: Duration) -> Vec<String> {
    if addr.is_ipv6() {
        return vec!["-c".into(), "1".into(), addr.to_string()];
    }
    let millis = timeout.as_millis().max(1).to_string();
    vec!["-c".into(), "1".into(), "-W".into(), millis, addr.to_string()]
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn ping_args(addr: IpAddr, timeout: Duration) -> Vec<String> {
    // iputils takes whole seconds for -W
    let secs = timeout.as_secs().max(1).to_string();
    let mut args: Vec<String> = vec!["-n".into(), "-c".into(), "1".into(), "-W".into(), secs];
    if addr.is_ipv6() {
        args.push("-6".into());
    }
    args.push(addr.to_string());
    args
}

/// ICMP first, TCP handshake once ICMP turns out to be unusable.
pub struct FallbackProbe<P, F> {
    primary: P,
    fallback: F,
    primary_unusable: AtomicBool,
}

impl<P: HostProber, F: HostProber> FallbackProbe<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self {
            primary,
            fallback,
            primary_unusable: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl<P: HostProber, F: HostProber> HostProber for FallbackProbe<P, F> {
    async fn probe(&self, addr: IpAddr) -> Reachability {
        if !self.primary_unusable.load(Ordering::Relaxed) {
            match self.primary.probe(addr).await {
                Reachability::Unreachable(
                    ProbeFailure::Unsupported | ProbeFailure::PermissionDenied,
                ) => {
                    if !self.primary_unusable.swap(true, Ordering::Relaxed) {
                        warn!("ICMP echo unavailable, falling back to TCP handshake discovery");
                    }
                }
                outcome => return outcome,
            }
        }
        self.fallback.probe(addr).await
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
