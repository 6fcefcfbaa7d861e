use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use netscout_common::config::{HostProbeMethod, ScanConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Loopback-friendly config: handshake discovery, no DNS, short timeouts.
pub fn loopback_config(target: &str, handshake_port: u16) -> ScanConfig {
    let mut config = ScanConfig::new(target);
    config.host_probe = HostProbeMethod::Handshake;
    config.handshake_ports = vec![handshake_port];
    config.no_dns = true;
    config.timeouts.host = Duration::from_millis(500);
    config.timeouts.connect = Duration::from_millis(500);
    config.timeouts.read = Duration::from_millis(500);
    config.timeouts.login = Duration::from_secs(1);
    config.timeouts.login_settle = Duration::from_millis(20);
    config
}

/// A port nothing listens on.
pub async fn free_port() -> u16 {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Sends `banner` to every client, then hangs up.
pub async fn banner_server(banner: &'static [u8]) -> u16 {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = socket.write_all(banner).await;
            });
        }
    });
    port
}

/// Telnet-style login prompt accepting exactly `user`/`pass`.
///
/// Connections that send nothing (port sweep probes) just get the prompt.
pub async fn telnet_server(user: &'static str, pass: &'static str) -> u16 {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                if socket.write_all(b"login: ").await.is_err() {
                    return;
                }
                let mut received = Vec::new();
                let mut buf = [0u8; 128];
                while received.iter().filter(|&&b| b == b'\n').count() < 2 {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => received.extend_from_slice(&buf[..n]),
                    }
                }
                let text = String::from_utf8_lossy(&received);
                let mut lines = text.lines().map(str::trim);
                let ok = lines.next() == Some(user) && lines.next() == Some(pass);
                let reply: &[u8] = if ok {
                    b"\r\nWelcome\r\n$ "
                } else {
                    b"\r\nLogin incorrect\r\nlogin: "
                };
                let _ = socket.write_all(reply).await;
            });
        }
    });
    port
}
