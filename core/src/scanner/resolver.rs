use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use netscout_protocols::dns;
use tokio::net::UdpSocket;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, trace};

use crate::probe::NameResolver;

const RESOLV_CONF: &str = "/etc/resolv.conf";
const MAX_DNS_DATAGRAM: usize = 512;

/// Reverse (PTR) lookups against one recursive resolver over UDP.
pub struct PtrResolver {
    server: SocketAddr,
    timeout: Duration,
    id_counter: AtomicU16,
}

impl PtrResolver {
    pub fn new(server: SocketAddr, timeout: Duration) -> Self {
        Self {
            server,
            timeout,
            id_counter: AtomicU16::new(0),
        }
    }

    /// Uses the first `nameserver` of the system resolver configuration.
    pub fn from_system(timeout: Duration) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(RESOLV_CONF)
            .with_context(|| format!("reading {RESOLV_CONF}"))?;
        let server = dns::nameserver_from_resolv_conf(&contents)
            .with_context(|| format!("no nameserver in {RESOLV_CONF}"))?;
        Ok(Self::new(SocketAddr::new(server, dns::DNS_PORT), timeout))
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    async fn query(&self, ip: IpAddr) -> anyhow::Result<String> {
        let id: u16 = self.get_next_trans_id();
        let bytes: Vec<u8> = dns::create_ptr_packet(&ip, id)?;

        let bind_addr: SocketAddr = match self.server {
            SocketAddr::V4(_) => "0.0.0.0:0".parse()?,
            SocketAddr::V6(_) => "[::]:0".parse()?,
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(self.server).await?;
        socket.send(&bytes).await?;

        let deadline = Instant::now() + self.timeout;
        let mut buf = [0u8; MAX_DNS_DATAGRAM];
        loop {
            let n = timeout_at(deadline, socket.recv(&mut buf))
                .await
                .context("reverse lookup timed out")??;
            let Ok((response_id, hostname)) = dns::get_hostname(&buf[..n]) else {
                trace!("ignoring unparseable DNS reply for {ip}");
                continue;
            };
            if response_id != id {
                trace!("ignoring stale DNS reply {response_id} for {ip}");
                continue;
            }
            match hostname {
                Some(hostname) => return Ok(hostname),
                None => bail!("no PTR record for {ip}"),
            }
        }
    }

    fn get_next_trans_id(&self) -> u16 {
        self.id_counter.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl NameResolver for PtrResolver {
    async fn resolve(&self, addr: IpAddr) -> Option<String> {
        match self.query(addr).await {
            Ok(name) => Some(name),
            Err(e) => {
                debug!("no reverse name for {addr}: {e:#}");
                None
            }
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
