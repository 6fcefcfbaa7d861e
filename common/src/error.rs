use std::io;

use serde::Serialize;
use thiserror::Error;

/// Rejected scan input. Raised before any probe is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid network range '{input}': {reason}")]
    InvalidCidr { input: String, reason: String },

    #[error("network range {input} holds {hosts} hosts, more than the {max} a sweep allows")]
    RangeTooLarge { input: String, hosts: u128, max: u128 },

    #[error("port {0} is outside 1-65535")]
    InvalidPort(u32),

    #[error("port range {start}-{end} is empty")]
    InvalidPortRange { start: u32, end: u32 },

    #[error("invalid port range '{0}'")]
    MalformedPortRange(String),

    #[error("{pool} concurrency must be at least 1")]
    ZeroConcurrency { pool: &'static str },

    #[error("{0} timeout must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("credential probing is enabled but the credential list is empty")]
    EmptyCredentialList,

    #[error("host discovery needs at least one handshake port")]
    NoHandshakePorts,
}

/// Why a single probe came back negative.
///
/// Every transient network error is folded into one of these; none of them is
/// ever surfaced as an `Err` from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeFailure {
    Timeout,
    Refused,
    Unreachable,
    PermissionDenied,
    /// Socket or descriptor limits hit under load.
    ResourceExhausted,
    /// The probing mechanism itself is missing (e.g. no `ping` binary).
    Unsupported,
    Closed,
    Other,
}

impl From<&io::Error> for ProbeFailure {
    fn from(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ProbeFailure::Timeout,
            io::ErrorKind::ConnectionRefused => ProbeFailure::Refused,
            io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
                ProbeFailure::Unreachable
            }
            io::ErrorKind::PermissionDenied => ProbeFailure::PermissionDenied,
            io::ErrorKind::NotFound | io::ErrorKind::Unsupported => ProbeFailure::Unsupported,
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof => ProbeFailure::Closed,
            _ if is_descriptor_exhaustion(err) => ProbeFailure::ResourceExhausted,
            _ => ProbeFailure::Other,
        }
    }
}

impl From<io::Error> for ProbeFailure {
    fn from(err: io::Error) -> Self {
        ProbeFailure::from(&err)
    }
}

// EMFILE / ENFILE
#[cfg(unix)]
fn is_descriptor_exhaustion(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(23) | Some(24))
}

#[cfg(not(unix))]
fn is_descriptor_exhaustion(_err: &io::Error) -> bool {
    false
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
