use std::collections::BTreeMap;
use std::net::IpAddr;

use serde::Serialize;

use crate::findings::{CredentialFinding, PortFinding};
use crate::network::host::HostResult;
use crate::stats::ScanStatistics;

/// Everything a completed (or stopped) run produced.
///
/// Only live hosts appear as keys in `port_findings`; a live host that was
/// scanned but had nothing open maps to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub host_results: Vec<HostResult>,
    pub port_findings: BTreeMap<IpAddr, Vec<PortFinding>>,
    pub credential_findings: Vec<CredentialFinding>,
    pub statistics: ScanStatistics,
    /// Set when the run was stopped before all work was dispatched.
    pub cancelled: bool,
}

impl ScanResult {
    pub fn live_hosts(&self) -> impl Iterator<Item = &HostResult> {
        self.host_results.iter().filter(|host| host.reachable)
    }

    pub fn findings_for(&self, addr: &IpAddr) -> &[PortFinding] {
        self.port_findings
            .get(addr)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.live_hosts().next().is_none()
    }
}
