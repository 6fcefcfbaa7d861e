use std::net::IpAddr;

use colored::*;
use netscout_common::findings::{PortFinding, RiskTier};
use netscout_common::network::host::HostResult;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn ip_to_detail(addr: &IpAddr) -> Detail {
    match addr {
        IpAddr::V4(v4) => ("IPv4".to_string(), v4.to_string().color(colors::IPV4_ADDR)),
        IpAddr::V6(v6) => ("IPv6".to_string(), v6.to_string().color(colors::IPV6_ADDR)),
    }
}

pub fn host_to_details(host: &HostResult) -> Vec<Detail> {
    let name: ColoredString = match &host.resolved_name {
        Some(name) => name.color(colors::SECONDARY),
        None => "No hostname".dimmed(),
    };
    let status: ColoredString = if host.reachable {
        "Online".green()
    } else {
        "No reply".red()
    };

    vec![
        ip_to_detail(&host.address),
        ("Name".to_string(), name),
        ("Status".to_string(), status),
    ]
}

/// Colours `text` by how exposed `tier` is.
pub fn risk_colored(tier: RiskTier, text: String) -> ColoredString {
    match tier {
        RiskTier::High => text.color(colors::RISK_HIGH).bold(),
        RiskTier::Medium => text.color(colors::RISK_MEDIUM),
        RiskTier::Low => text.color(colors::RISK_LOW),
    }
}

/// Highest tier among `findings`, if any port is open.
pub fn worst_risk(findings: &[PortFinding]) -> Option<RiskTier> {
    findings.iter().map(|finding| finding.risk_tier).max()
}

pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}
