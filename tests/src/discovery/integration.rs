use std::net::IpAddr;

use netscout_core::ScanCoordinator;

use crate::support::{LOCALHOST, free_port, loopback_config};

#[tokio::test]
async fn discovery_single_loopback() {
    // Refused handshakes still prove the host is up.
    let config = loopback_config("127.0.0.1", free_port().await);
    let result = ScanCoordinator::new(&config).unwrap().discover().await;

    let live: Vec<IpAddr> = result.live_hosts().map(|h| h.address).collect();
    assert_eq!(live, vec![LOCALHOST]);
    assert_eq!(result.statistics.hosts_total, 1);
    assert_eq!(result.statistics.hosts_alive, 1);
}

#[tokio::test]
#[cfg(target_os = "linux")]
async fn discovery_range_loopback() {
    // Linux answers on all of 127.0.0.0/8.
    let config = loopback_config("127.0.0.0/29", free_port().await);
    let result = ScanCoordinator::new(&config).unwrap().discover().await;

    let live: Vec<IpAddr> = result.live_hosts().map(|h| h.address).collect();
    let expected: Vec<IpAddr> = (1..=6)
        .map(|last| format!("127.0.0.{last}").parse().unwrap())
        .collect();
    assert_eq!(live, expected);
}

#[tokio::test]
#[ignore]
async fn discovery_via_system_ping() {
    let mut config = loopback_config("127.0.0.1", free_port().await);
    config.host_probe = netscout_common::config::HostProbeMethod::Icmp;
    let result = ScanCoordinator::new(&config).unwrap().discover().await;
    assert_eq!(result.statistics.hosts_alive, 1);
}
