//! Port/banner classification. Pure; no I/O.

use netscout_common::findings::{PortFinding, RiskTier};

pub const UNKNOWN_SERVICE: &str = "Unknown service";

const HIGH_RISK_PORTS: &[u16] = &[21, 23, 135, 139, 445];
const MEDIUM_RISK_PORTS: &[u16] = &[22, 80, 443];

const WELL_KNOWN: &[(u16, &str)] = &[
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (80, "HTTP"),
    (110, "POP3"),
    (135, "MSRPC"),
    (139, "NetBIOS-SSN"),
    (143, "IMAP"),
    (443, "HTTPS"),
    (445, "SMB"),
    (993, "IMAPS"),
    (995, "POP3S"),
];

/// Risk depends on the port alone; a banner never changes it.
pub fn risk_tier(port: u16) -> RiskTier {
    if HIGH_RISK_PORTS.contains(&port) {
        RiskTier::High
    } else if MEDIUM_RISK_PORTS.contains(&port) {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

pub fn well_known_label(port: u16) -> Option<&'static str> {
    WELL_KNOWN
        .iter()
        .find_map(|&(known, label)| (known == port).then_some(label))
}

/// Returns `(service_label, risk_tier)`.
///
/// The first non-empty banner line wins as the label. Without one the port
/// table is consulted, then [`UNKNOWN_SERVICE`].
pub fn classify(port: u16, banner: Option<&str>) -> (String, RiskTier) {
    let from_banner = banner.and_then(|text| {
        text.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
    });

    let label = match from_banner {
        Some(line) => line.to_string(),
        None => well_known_label(port).unwrap_or(UNKNOWN_SERVICE).to_string(),
    };

    (label, risk_tier(port))
}

pub fn finding(port: u16, banner: Option<String>) -> PortFinding {
    let (service_label, risk_tier) = classify(port, banner.as_deref());
    PortFinding {
        port,
        service_label,
        banner_text: banner,
        risk_tier,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_label_without_banner() {
        assert_eq!(classify(22, None), ("SSH".to_string(), RiskTier::Medium));
        assert_eq!(classify(443, None), ("HTTPS".to_string(), RiskTier::Medium));
        assert_eq!(classify(445, None), ("SMB".to_string(), RiskTier::High));
    }

    #[test]
    fn unmapped_port_is_unknown_and_low() {
        assert_eq!(
            classify(9999, None),
            (UNKNOWN_SERVICE.to_string(), RiskTier::Low)
        );
    }

    #[test]
    fn banner_overrides_label_but_not_risk() {
        let (label, risk) = classify(23, Some("Welcome to BusyBox"));
        assert_eq!(label, "Welcome to BusyBox");
        assert_eq!(risk, RiskTier::High);

        let (label, risk) = classify(2222, Some("SSH-2.0-dropbear"));
        assert_eq!(label, "SSH-2.0-dropbear");
        assert_eq!(risk, RiskTier::Low);
    }

    #[test]
    fn blank_banner_falls_back_to_table() {
        assert_eq!(classify(21, Some("  \r\n")).0, "FTP");
    }

    #[test]
    fn risk_policy_is_exact() {
        for port in [21, 23, 135, 139, 445] {
            assert_eq!(risk_tier(port), RiskTier::High, "port {port}");
        }
        for port in [22, 80, 443] {
            assert_eq!(risk_tier(port), RiskTier::Medium, "port {port}");
        }
        for port in [1, 25, 53, 8080, 3389, 65535] {
            assert_eq!(risk_tier(port), RiskTier::Low, "port {port}");
        }
    }

    #[test]
    fn finding_keeps_raw_banner() {
        let f = finding(22, Some("SSH-2.0-OpenSSH_8.9".into()));
        assert_eq!(f.service_label, "SSH-2.0-OpenSSH_8.9");
        assert_eq!(f.banner_text.as_deref(), Some("SSH-2.0-OpenSSH_8.9"));
        assert_eq!(f.risk_tier, RiskTier::Medium);
    }
}
