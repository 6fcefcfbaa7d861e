//! Line-oriented login dialects used by the weak-credential probe.
//!
//! A login is judged purely on the text the server sends back after the
//! password line: if none of [`FAILURE_MARKERS`] appears (case-insensitive) the
//! attempt counts as accepted. Servers that word their rejection differently,
//! or close the connection silently, will read as accepted.

pub use netscout_common::config::TELNET_PORT;

pub const FTP_PORT: u16 = 21;

pub const FAILURE_MARKERS: &[&str] = &["incorrect", "failed"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginDialect {
    /// Bare `username\r\n` / `password\r\n` lines, as typed at a prompt.
    Telnet,
    /// `USER` / `PASS` commands.
    Ftp,
}

impl LoginDialect {
    /// FTP's command dialect on its well-known port, raw lines anywhere else.
    pub fn for_port(port: u16) -> Self {
        match port {
            FTP_PORT => LoginDialect::Ftp,
            _ => LoginDialect::Telnet,
        }
    }

    pub fn username_line(&self, username: &str) -> Vec<u8> {
        match self {
            LoginDialect::Telnet => format!("{username}\r\n").into_bytes(),
            LoginDialect::Ftp => format!("USER {username}\r\n").into_bytes(),
        }
    }

    pub fn password_line(&self, password: &str) -> Vec<u8> {
        match self {
            LoginDialect::Telnet => format!("{password}\r\n").into_bytes(),
            LoginDialect::Ftp => format!("PASS {password}\r\n").into_bytes(),
        }
    }
}

impl LoginDialect {
    /// Whether the server answers every command line with its own reply.
    pub fn replies_per_line(&self) -> bool {
        matches!(self, LoginDialect::Ftp)
    }

    /// Whether `response` holds a complete reply.
    ///
    /// Telnet has no framing, so whatever arrived is taken as is. FTP replies
    /// end with a line of three digits and a space (`530 Login incorrect.`);
    /// `1xx` preliminary replies and `530-` continuation lines do not count.
    pub fn reply_complete(&self, response: &[u8]) -> bool {
        match self {
            LoginDialect::Telnet => true,
            LoginDialect::Ftp => response.split(|&b| b == b'\n').any(is_final_ftp_line),
        }
    }
}

fn is_final_ftp_line(line: &[u8]) -> bool {
    match line {
        [a, b, c, b' ', ..] => {
            a.is_ascii_digit() && b.is_ascii_digit() && c.is_ascii_digit() && *a != b'1'
        }
        _ => false,
    }
}

/// `true` when the response carries a known failure marker.
pub fn is_rejection(response: &[u8]) -> bool {
    let text = String::from_utf8_lossy(response).to_lowercase();
    FAILURE_MARKERS.iter().any(|marker| text.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_lines() {
        let telnet = LoginDialect::for_port(TELNET_PORT);
        assert_eq!(telnet.username_line("admin"), b"admin\r\n");
        assert_eq!(telnet.password_line(""), b"\r\n");

        let ftp = LoginDialect::for_port(FTP_PORT);
        assert_eq!(ftp.username_line("root"), b"USER root\r\n");
        assert_eq!(ftp.password_line("root"), b"PASS root\r\n");

        assert_eq!(LoginDialect::for_port(2323), LoginDialect::Telnet);
    }

    #[test]
    fn ftp_reply_needs_a_final_line() {
        let ftp = LoginDialect::Ftp;
        assert!(!ftp.reply_complete(b""));
        assert!(!ftp.reply_complete(b"530-Login incorrect.\r\n"));
        assert!(!ftp.reply_complete(b"150 Opening data connection\r\n"));
        assert!(ftp.reply_complete(b"530-Login incorrect.\r\n530 Bye\r\n"));
        assert!(ftp.reply_complete(b"230 Login successful.\r\n"));

        assert!(LoginDialect::Telnet.reply_complete(b""));
        assert!(ftp.replies_per_line());
        assert!(!LoginDialect::Telnet.replies_per_line());
    }

    #[test]
    fn rejection_markers_are_case_insensitive() {
        assert!(is_rejection(b"\r\nLogin incorrect\r\nlogin: "));
        assert!(is_rejection(b"530 Authentication FAILED."));
        assert!(!is_rejection(b"Welcome to BusyBox\r\n# "));
        assert!(!is_rejection(b""));
    }
}
