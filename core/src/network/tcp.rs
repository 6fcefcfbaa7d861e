use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use netscout_common::error::ProbeFailure;
use netscout_protocols::{banner, http};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::trace;

use crate::probe::{HostProber, PortProber, PortState, Reachability};

/// Ports that wrap everything in TLS; a plaintext read would only stall.
pub const TLS_PORTS: &[u16] = &[443, 465, 993, 995, 8443];

/// How to get a service to identify itself after connecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerStyle {
    /// Server speaks first (SSH, FTP, SMTP, Telnet, ...): read straight away.
    Passive,
    /// Client speaks first: send a request line, then read.
    HttpRequest,
    /// Encrypted from the first byte: do not read.
    Tls,
}

impl BannerStyle {
    pub fn for_port(port: u16) -> Self {
        if TLS_PORTS.contains(&port) {
            BannerStyle::Tls
        } else if http::is_http_port(port) {
            BannerStyle::HttpRequest
        } else {
            BannerStyle::Passive
        }
    }
}

/// Connects with a deadline, folding every failure into a [`ProbeFailure`].
pub async fn connect(addr: SocketAddr, deadline: Duration) -> Result<TcpStream, ProbeFailure> {
    match timeout(deadline, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(ProbeFailure::from(&e)),
        Err(_elapsed) => Err(ProbeFailure::Timeout),
    }
}

/// Single read with a deadline. Zero bytes means the peer closed.
pub async fn read_once(
    stream: &mut TcpStream,
    buf: &mut [u8],
    deadline: Duration,
) -> Result<usize, ProbeFailure> {
    match timeout(deadline, stream.read(buf)).await {
        Ok(Ok(n)) => Ok(n),
        Ok(Err(e)) => Err(ProbeFailure::from(&e)),
        Err(_elapsed) => Err(ProbeFailure::Timeout),
    }
}

/// Connect-and-banner probe for one `(host, port)` pair.
///
/// The stream is owned by the probe call and dropped on every return path, so
/// no descriptor outlives its probe.
#[derive(Debug, Clone)]
pub struct TcpPortProbe {
    connect_timeout: Duration,
    read_timeout: Duration,
    banner_max_len: usize,
}

impl TcpPortProbe {
    pub fn new(connect_timeout: Duration, read_timeout: Duration, banner_max_len: usize) -> Self {
        Self {
            connect_timeout,
            read_timeout,
            banner_max_len,
        }
    }

    /// Connects and identifies the service using `style` rather than the
    /// style the port number implies.
    pub async fn probe_with_style(&self, addr: IpAddr, port: u16, style: BannerStyle) -> PortState {
        let socket_addr = SocketAddr::new(addr, port);
        let mut stream = match connect(socket_addr, self.connect_timeout).await {
            Ok(stream) => stream,
            Err(failure) => return PortState::Closed(failure),
        };

        let banner = self.grab_banner(&mut stream, addr, port, style).await;
        PortState::Open { banner }
    }

    async fn grab_banner(
        &self,
        stream: &mut TcpStream,
        addr: IpAddr,
        port: u16,
        style: BannerStyle,
    ) -> Option<String> {
        match style {
            BannerStyle::Tls => return None,
            BannerStyle::HttpRequest => {
                let request: Vec<u8> = http::probe_request(&addr);
                if let Err(e) = stream.write_all(&request).await {
                    trace!("{addr}:{port} rejected the HTTP probe: {e}");
                    return None;
                }
            }
            BannerStyle::Passive => {}
        }

        let mut buf = [0u8; banner::READ_BUFFER_LEN];
        match read_once(stream, &mut buf, self.read_timeout).await {
            Ok(n) => banner::first_line(&buf[..n], self.banner_max_len),
            Err(failure) => {
                trace!("{addr}:{port} sent no banner ({failure:?})");
                None
            }
        }
    }
}

#[async_trait]
impl PortProber for TcpPortProbe {
    async fn probe(&self, addr: IpAddr, port: u16) -> PortState {
        self.probe_with_style(addr, port, BannerStyle::for_port(port)).await
    }
}

/// Reachability by TCP handshake, for when ICMP is not an option.
///
/// All `ports` are tried at once. A completed handshake *or* an explicit
/// refusal proves the host is up; only silence until the deadline, or a
/// routing error, counts as unreachable.
#[derive(Debug, Clone)]
pub struct HandshakeProbe {
    ports: Vec<u16>,
    timeout: Duration,
}

impl HandshakeProbe {
    pub fn new(ports: Vec<u16>, timeout: Duration) -> Self {
        Self { ports, timeout }
    }
}

#[async_trait]
impl HostProber for HandshakeProbe {
    async fn probe(&self, addr: IpAddr) -> Reachability {
        let started = Instant::now();
        let mut attempts: JoinSet<Result<(), ProbeFailure>> = JoinSet::new();

        for &port in &self.ports {
            let socket_addr = SocketAddr::new(addr, port);
            let deadline = self.timeout;
            attempts.spawn(async move {
                match connect(socket_addr, deadline).await {
                    Ok(_) | Err(ProbeFailure::Refused) => Ok(()),
                    Err(failure) => Err(failure),
                }
            });
        }

        let mut last_failure = ProbeFailure::Timeout;
        while let Some(joined) = attempts.join_next().await {
            match joined {
                Ok(Ok(())) => {
                    return Reachability::Reachable {
                        rtt: started.elapsed(),
                    };
                }
                Ok(Err(failure)) => last_failure = failure,
                Err(_) => last_failure = ProbeFailure::Other,
            }
        }

        Reachability::Unreachable(last_failure)
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
