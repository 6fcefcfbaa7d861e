use std::net::IpAddr;

use serde::Serialize;

/// Outcome of probing one address during discovery.
///
/// Produced once per probed address and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostResult {
    pub address: IpAddr,
    pub reachable: bool,
    pub resolved_name: Option<String>,
}

impl HostResult {
    pub fn reachable(address: IpAddr) -> Self {
        Self {
            address,
            reachable: true,
            resolved_name: None,
        }
    }

    pub fn unreachable(address: IpAddr) -> Self {
        Self {
            address,
            reachable: false,
            resolved_name: None,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.resolved_name = name;
        self
    }
}
