use std::net::IpAddr;

/// Ports that only talk after the client speaks first.
pub const HTTP_PORTS: &[u16] = &[80, 8000, 8008, 8080, 8888];

pub fn is_http_port(port: u16) -> bool {
    HTTP_PORTS.contains(&port)
}

/// Minimal request that makes an HTTP server answer with a status line.
pub fn probe_request(host: &IpAddr) -> Vec<u8> {
    let host = match host {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{v6}]"),
    };
    format!("GET / HTTP/1.1\r\nHost: {host}\r\n\r\n").into_bytes()
}
