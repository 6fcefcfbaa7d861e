use std::net::IpAddr;

use colored::*;
use netscout_common::config::{DEFAULT_PORT_END, DEFAULT_PORT_START};
use netscout_common::findings::{CredentialFinding, PortFinding};
use netscout_common::network::host::HostResult;
use netscout_common::network::range::{NetworkRange, PortRange};
use netscout_common::result::ScanResult;
use netscout_common::stats::ScanStatistics;
use netscout_common::{success, warn};
use netscout_core::ScanCoordinator;

use crate::commands::discover::warn_if_public;
use crate::commands::{ScanOptions, Stage, drive};
use crate::export::{self, ScanKind};
use crate::mprint;
use crate::terminal::format::{self, Detail};
use crate::terminal::{colors, print};

/// `scan`: the full pipeline over a range. Kind is `deep_scan` with the
/// default ports and `custom_scan` otherwise.
pub async fn scan(target: NetworkRange, ports: Option<PortRange>, opts: ScanOptions) -> anyhow::Result<()> {
    let (ports, kind) = match ports {
        Some(ports) => (ports, ScanKind::CustomScan),
        None => (
            PortRange::new(DEFAULT_PORT_START, DEFAULT_PORT_END)?,
            ScanKind::DeepScan,
        ),
    };
    run(target, ports, kind, opts).await
}

/// `target`: every TCP port of a single host.
pub async fn target(address: IpAddr, opts: ScanOptions) -> anyhow::Result<()> {
    let ports = PortRange::new(1, u32::from(u16::MAX))?;
    run(NetworkRange::single(address), ports, ScanKind::TargetScan, opts).await
}

async fn run(target: NetworkRange, ports: PortRange, kind: ScanKind, opts: ScanOptions) -> anyhow::Result<()> {
    let config = opts.to_config(target.to_string(), ports);
    let coordinator = ScanCoordinator::new(&config)?;

    let plan = coordinator.plan();
    warn_if_public(&plan.range);
    print::field("Target", plan.range.to_string());
    print::field("Ports", plan.ports.to_string());
    print::field("Host probe", plan.config.host_probe.to_string());

    let result: ScanResult = drive(coordinator, Stage::Full, "scan").await;
    scan_ends(&result);

    if let Some(path) = &opts.output {
        let saved = export::save(path.as_deref(), kind, &target.to_string(), &result)?;
        success!("Results saved to {}", saved.display());
    }
    Ok(())
}

fn scan_ends(result: &ScanResult) {
    let live: Vec<&HostResult> = result.live_hosts().collect();
    if live.is_empty() {
        print::section("Service Survey");
        print::nothing_found("hosts");
        print_statistics(&result.statistics);
        return;
    }

    print::section("Service Survey");
    for (idx, host) in live.iter().enumerate() {
        print_host(host, idx, result.findings_for(&host.address));
        if idx + 1 != live.len() {
            mprint!();
        }
    }

    if !result.credential_findings.is_empty() {
        print::section("Default Credentials Accepted");
        for finding in &result.credential_findings {
            print_credential(finding);
        }
    }

    print_statistics(&result.statistics);
    if result.cancelled {
        warn!("Scan was interrupted; the results above are partial");
    }
}

fn print_host(host: &HostResult, idx: usize, findings: &[PortFinding]) {
    let mut details: Vec<Detail> = vec![format::ip_to_detail(&host.address)];
    if let Some(name) = &host.resolved_name {
        details.push(("Name".to_string(), name.color(colors::SECONDARY)));
    }

    let Some(worst) = format::worst_risk(findings) else {
        details.push((
            "Ports".to_string(),
            "none open, possibly firewalled".dimmed(),
        ));
        print::host_entry(idx, &host.address.to_string(), &details);
        return;
    };

    details.push((
        "Exposure".to_string(),
        format::risk_colored(worst, format!("{worst} ({} open)", findings.len())),
    ));
    print::host_entry(idx, &host.address.to_string(), &details);
    print::port_table(findings);
}

fn print_credential(finding: &CredentialFinding) {
    let login: ColoredString = format!("{}:{}", finding.username, finding.password).bold();
    let location: ColoredString =
        format!("{}:{}", finding.host, finding.port).color(colors::PRIMARY);
    print::alert(&format!(
        "{} {location} accepts {login}, change this password",
        "VULNERABLE".color(colors::RISK_HIGH).bold()
    ));
}

fn print_statistics(stats: &ScanStatistics) {
    print::section("Statistics");
    print::field("Hosts scanned", stats.hosts_total.to_string());
    print::field(
        "Hosts alive",
        format!(
            "{} ({:.1}%)",
            stats.hosts_alive,
            format::percentage(stats.hosts_alive, stats.hosts_total)
        ),
    );
    print::field("Ports probed", stats.ports_total.to_string());
    print::field(
        "Ports open",
        format!(
            "{} ({:.1}%)",
            stats.ports_open,
            format::percentage(stats.ports_open, stats.ports_total)
        ),
    );
    let vulns: ColoredString = if stats.vulnerabilities_found > 0 {
        stats.vulnerabilities_found.to_string().color(colors::RISK_HIGH).bold()
    } else {
        stats.vulnerabilities_found.to_string().normal()
    };
    print::field("Weak logins", vulns);
    print::field("Scan time", format!("{:.2}s", stats.elapsed.as_secs_f64()));
    print::rule();
}
