use std::collections::BTreeSet;

use netscout_common::error::ConfigError;
use netscout_common::findings::RiskTier;
use netscout_core::{ScanCoordinator, run_scan};

use crate::support::{LOCALHOST, banner_server, free_port, loopback_config, telnet_server};

#[tokio::test]
async fn ssh_banner_becomes_the_service_label() -> anyhow::Result<()> {
    let port = banner_server(b"SSH-2.0-OpenSSH_8.9\r\n").await;
    let config = loopback_config("127.0.0.1", port).with_ports(port.into(), port.into());

    let result = run_scan(&config).await?;

    let findings = result.findings_for(&LOCALHOST);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].port, port);
    assert_eq!(findings[0].service_label, "SSH-2.0-OpenSSH_8.9");
    assert_eq!(findings[0].risk_tier, RiskTier::Low);
    assert_eq!(result.statistics.ports_total, 1);
    assert_eq!(result.statistics.ports_open, 1);
    Ok(())
}

#[tokio::test]
async fn closed_ports_produce_an_empty_finding_list() -> anyhow::Result<()> {
    let port = free_port().await;
    let config = loopback_config("127.0.0.1", port).with_ports(port.into(), port.into());

    let result = run_scan(&config).await?;

    assert!(result.port_findings.contains_key(&LOCALHOST));
    assert!(result.findings_for(&LOCALHOST).is_empty());
    assert_eq!(result.statistics.ports_open, 0);
    assert_eq!(result.statistics.ports_total, 1);
    Ok(())
}

#[tokio::test]
async fn telnet_default_login_is_reported_once() -> anyhow::Result<()> {
    let port = telnet_server("admin", "admin").await;
    let mut config = loopback_config("127.0.0.1", port).with_ports(port.into(), port.into());
    config.credential_ports = BTreeSet::from([port]);

    let result = run_scan(&config).await?;

    assert_eq!(result.credential_findings.len(), 1);
    let hit = &result.credential_findings[0];
    assert_eq!(hit.host, LOCALHOST);
    assert_eq!(hit.port, port);
    assert_eq!((hit.username.as_str(), hit.password.as_str()), ("admin", "admin"));
    assert_eq!(result.statistics.vulnerabilities_found, 1);
    Ok(())
}

#[tokio::test]
async fn rejected_logins_leave_no_finding() -> anyhow::Result<()> {
    let port = telnet_server("operator", "s3cret").await;
    let mut config = loopback_config("127.0.0.1", port).with_ports(port.into(), port.into());
    config.credential_ports = BTreeSet::from([port]);

    let result = run_scan(&config).await?;

    assert!(result.credential_findings.is_empty());
    assert_eq!(result.statistics.vulnerabilities_found, 0);
    assert_eq!(result.findings_for(&LOCALHOST).len(), 1);
    Ok(())
}

#[tokio::test]
async fn stopped_coordinator_returns_partial_result() {
    let config = loopback_config("127.0.0.0/24", free_port().await);
    let coordinator = ScanCoordinator::new(&config).unwrap();
    coordinator.stop_handle().stop();

    let result = coordinator.run().await;
    assert!(result.cancelled);
    assert_eq!(result.statistics.ports_total, 0);
}

#[tokio::test]
async fn config_errors_surface_before_any_probe() {
    let config = loopback_config("not-a-network", 80);
    assert!(matches!(
        run_scan(&config).await,
        Err(ConfigError::InvalidCidr { .. })
    ));
}
