use std::time::Duration;

use colored::*;
use netscout_common::config::{DEFAULT_PORT_END, DEFAULT_PORT_START};
use netscout_common::network::host::HostResult;
use netscout_common::network::range::{NetworkRange, PortRange};
use netscout_common::result::ScanResult;
use netscout_common::utils::ip;
use netscout_common::{success, warn};
use netscout_core::ScanCoordinator;

use crate::commands::{ScanOptions, Stage, drive};
use crate::export::{self, ScanKind};
use crate::mprint;
use crate::terminal::{colors, format, print};

pub async fn discover(target: NetworkRange, opts: ScanOptions) -> anyhow::Result<()> {
    let ports = PortRange::new(DEFAULT_PORT_START, DEFAULT_PORT_END)?;
    let config = opts.to_config(target.to_string(), ports);
    let coordinator = ScanCoordinator::new(&config)?;

    warn_if_public(&target);

    let result: ScanResult = drive(coordinator, Stage::DiscoveryOnly, "discovery").await;
    discovery_ends(&result);

    if let Some(path) = &opts.output {
        let saved = export::save(path.as_deref(), ScanKind::Ping, &target.to_string(), &result)?;
        success!("Results saved to {}", saved.display());
    }
    Ok(())
}

pub(crate) fn warn_if_public(target: &NetworkRange) {
    if !ip::is_private(&target.network()) {
        warn!("{target} is not a private range; only scan networks you are authorised to test");
    }
}

fn discovery_ends(result: &ScanResult) {
    let live: Vec<&HostResult> = result.live_hosts().collect();
    if live.is_empty() {
        no_hosts_found();
        return;
    }

    print::section("Network Discovery");
    for (idx, host) in live.iter().enumerate() {
        print_host_tree(host, idx);
        if idx + 1 != live.len() {
            mprint!();
        }
    }
    print_summary(live.len(), result.statistics.hosts_total, result.statistics.elapsed);
}

fn no_hosts_found() {
    print::section("Network Discovery");
    print::nothing_found("hosts");
}

fn print_host_tree(host: &HostResult, idx: usize) {
    let name = host.resolved_name.as_deref().unwrap_or("No hostname");
    print::host_entry(idx, name, &format::host_to_details(host));
}

fn print_summary(alive: usize, total: u64, total_time: Duration) {
    let active_hosts: ColoredString = format!("{alive}/{total} hosts").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!("Discovery Complete: {active_hosts} alive in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    print::rule();
    print::centered(&output);
}
