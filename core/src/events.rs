//! Read-only progress notifications.
//!
//! Events are fire-and-forget: nothing in the engine waits on them and a
//! dropped receiver is ignored, so a display layer may listen or not.

use std::net::IpAddr;

use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    DiscoveryStarted { hosts: u64 },
    HostProbed { addr: IpAddr, reachable: bool },
    PortSweepStarted { addr: IpAddr, ports: u64 },
    PortProbed { addr: IpAddr, port: u16, open: bool },
    CredentialTried { addr: IpAddr, port: u16, username: String },
    Finished,
}

#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<UnboundedSender<ScanEvent>>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<ScanEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn emit(&self, event: ScanEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
