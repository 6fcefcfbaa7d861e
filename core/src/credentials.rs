//! # Weak-credential probe
//!
//! Replays a short, ordered list of default credentials against a
//! line-oriented login prompt (Telnet, or FTP's `USER`/`PASS` on port 21) and
//! stops at the first one the server does not reject.
//!
//! Acceptance is a keyword heuristic, see [`netscout_protocols::login`]:
//! anything without a failure marker counts, including an empty reply. Expect
//! false positives from servers that reject in other words.
//!
//! FTP is read reply by reply: the `USER` answer is consumed before `PASS` is
//! sent, and the verdict is only judged once a final reply line has arrived,
//! so servers that delay failed logins are not mistaken for open ones.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use netscout_common::error::ProbeFailure;
use netscout_common::findings::{Credential, CredentialFinding};
use netscout_protocols::login::{self, LoginDialect};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, trace};

use crate::events::{EventSink, ScanEvent};
use crate::network::tcp::{connect, read_once};
use crate::pool::StopHandle;
use crate::probe::{LoginAttempt, LoginProber};

const RESPONSE_BUFFER_LEN: usize = 1024;

/// One fresh connection per attempt: connect, swallow the greeting, send the
/// username, settle, send the password, settle, read the verdict.
#[derive(Debug, Clone)]
pub struct LineLogin {
    timeout: Duration,
    settle: Duration,
}

impl LineLogin {
    pub fn new(timeout: Duration, settle: Duration) -> Self {
        Self { timeout, settle }
    }

    async fn send_line(&self, stream: &mut TcpStream, line: &[u8]) -> Result<(), ProbeFailure> {
        match timeout(self.timeout, stream.write_all(line)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ProbeFailure::from(&e)),
            Err(_elapsed) => Err(ProbeFailure::Timeout),
        }
    }

    /// Reads until `dialect` sees a complete reply, the peer closes, or the
    /// attempt timeout runs out. A timeout before a complete reply is a
    /// failure, not a verdict.
    async fn read_reply(
        &self,
        stream: &mut TcpStream,
        dialect: LoginDialect,
    ) -> Result<Vec<u8>, ProbeFailure> {
        let deadline = Instant::now() + self.timeout;
        let mut reply: Vec<u8> = Vec::new();
        let mut buf = [0u8; RESPONSE_BUFFER_LEN];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let n = read_once(stream, &mut buf, remaining).await?;
            if n == 0 {
                return Ok(reply);
            }
            reply.extend_from_slice(&buf[..n]);
            if dialect.reply_complete(&reply) || reply.len() >= RESPONSE_BUFFER_LEN {
                return Ok(reply);
            }
        }
    }

    async fn dialogue(
        &self,
        addr: IpAddr,
        port: u16,
        credential: &Credential,
        dialect: LoginDialect,
    ) -> Result<LoginAttempt, ProbeFailure> {
        let mut stream = connect(SocketAddr::new(addr, port), self.timeout).await?;

        self.read_reply(&mut stream, dialect).await?;

        self.send_line(&mut stream, &dialect.username_line(&credential.username))
            .await?;
        if dialect.replies_per_line() {
            self.read_reply(&mut stream, dialect).await?;
        } else {
            sleep(self.settle).await;
        }
        self.send_line(&mut stream, &dialect.password_line(&credential.password))
            .await?;
        sleep(self.settle).await;

        let reply = self.read_reply(&mut stream, dialect).await?;
        trace!(
            "{addr}:{port} answered {credential}: {:?}",
            String::from_utf8_lossy(&reply)
        );

        if login::is_rejection(&reply) {
            Ok(LoginAttempt::Rejected)
        } else {
            Ok(LoginAttempt::Accepted)
        }
    }

    /// One attempt spoken in `dialect` regardless of the port number.
    pub async fn attempt_as(
        &self,
        addr: IpAddr,
        port: u16,
        credential: &Credential,
        dialect: LoginDialect,
    ) -> LoginAttempt {
        self.dialogue(addr, port, credential, dialect)
            .await
            .unwrap_or_else(LoginAttempt::Failed)
    }
}

#[async_trait]
impl LoginProber for LineLogin {
    async fn attempt(&self, addr: IpAddr, port: u16, credential: &Credential) -> LoginAttempt {
        self.attempt_as(addr, port, credential, LoginDialect::for_port(port))
            .await
    }
}

/// Tries `credentials` in order and returns the first accepted one.
///
/// A failed attempt (timeout, refused, reset) moves on to the next credential
/// exactly like a rejection does.
pub async fn probe_credentials(
    prober: &dyn LoginProber,
    addr: IpAddr,
    port: u16,
    credentials: &[Credential],
    stop: &StopHandle,
    events: &EventSink,
) -> Option<CredentialFinding> {
    for credential in credentials {
        if stop.is_stopped() {
            break;
        }
        events.emit(ScanEvent::CredentialTried {
            addr,
            port,
            username: credential.username.clone(),
        });

        match prober.attempt(addr, port, credential).await {
            LoginAttempt::Accepted => {
                return Some(CredentialFinding::new(addr, port, credential));
            }
            LoginAttempt::Rejected => {}
            LoginAttempt::Failed(failure) => {
                debug!("login attempt {credential} on {addr}:{port} failed: {failure:?}");
            }
        }
    }
    None
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
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    use netscout_common::config::default_credentials;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt};
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    /// Accepts any credential in `accepted`, records the order of attempts.
    struct SimulatedLogin {
        accepted: Vec<Credential>,
        tried: Mutex<Vec<Credential>>,
    }

    #[async_trait]
    impl LoginProber for SimulatedLogin {
        async fn attempt(&self, _addr: IpAddr, _port: u16, credential: &Credential) -> LoginAttempt {
            self.tried.lock().unwrap().push(credential.clone());
            if self.accepted.contains(credential) {
                LoginAttempt::Accepted
            } else {
                LoginAttempt::Rejected
            }
        }
    }

    #[tokio::test]
    async fn first_accepted_credential_wins() {
        let sim = SimulatedLogin {
            accepted: vec![Credential::new("admin", "admin"), Credential::new("root", "root")],
            tried: Mutex::new(Vec::new()),
        };

        let finding = probe_credentials(
            &sim,
            LOCALHOST,
            23,
            &default_credentials(),
            &StopHandle::new(),
            &EventSink::default(),
        )
        .await;

        let finding = finding.unwrap();
        assert_eq!((finding.port, finding.username.as_str(), finding.password.as_str()), (23, "admin", "admin"));
        assert_eq!(sim.tried.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn all_rejected_tries_every_credential() {
        let sim = SimulatedLogin {
            accepted: Vec::new(),
            tried: Mutex::new(Vec::new()),
        };
        let creds = default_credentials();

        let finding =
            probe_credentials(&sim, LOCALHOST, 23, &creds, &StopHandle::new(), &EventSink::default())
                .await;

        assert!(finding.is_none());
        assert_eq!(*sim.tried.lock().unwrap(), creds);
    }

    /// Minimal Telnet-like server: greeting, two lines, verdict.
    async fn spawn_telnet(accept_user: &'static str, accept_pass: &'static str) -> u16 {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            loop {
                let (mut socket, _) = listener.accept().await.unwrap();
                tokio::spawn(async move {
                    socket.write_all(b"router login: ").await.unwrap();
                    let mut received = Vec::new();
                    let mut buf = [0u8; 64];
                    while received.iter().filter(|&&b| b == b'\n').count() < 2 {
                        let n = socket.read(&mut buf).await.unwrap();
                        if n == 0 {
                            return;
                        }
                        received.extend_from_slice(&buf[..n]);
                    }
                    let text = String::from_utf8_lossy(&received);
                    let mut lines = text.lines();
                    let user = lines.next().unwrap_or_default().trim();
                    let pass = lines.next().unwrap_or_default().trim();
                    let reply: &[u8] = if user == accept_user && pass == accept_pass {
                        b"\r\nBusyBox v1.31 built-in shell\r\n# "
                    } else {
                        b"\r\nLogin incorrect\r\nrouter login: "
                    };
                    let _ = socket.write_all(reply).await;
                });
            }
        });
        port
    }

    #[tokio::test]
    async fn line_login_against_loopback_server() {
        let port = spawn_telnet("root", "root").await;
        let login = LineLogin::new(Duration::from_secs(2), Duration::from_millis(20));

        assert_eq!(
            login.attempt(LOCALHOST, port, &Credential::new("admin", "admin")).await,
            LoginAttempt::Rejected
        );
        assert_eq!(
            login.attempt(LOCALHOST, port, &Credential::new("root", "root")).await,
            LoginAttempt::Accepted
        );
    }

    #[tokio::test]
    async fn closed_port_is_a_failed_attempt() {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let login = LineLogin::new(Duration::from_millis(500), Duration::from_millis(10));
        assert_eq!(
            login.attempt(LOCALHOST, port, &Credential::new("admin", "admin")).await,
            LoginAttempt::Failed(ProbeFailure::Refused)
        );
    }

    /// FTP server that makes failed logins wait `delay` before the 530, the
    /// way vsftpd does.
    async fn spawn_ftp(accept_pass: &'static str, delay: Duration) -> u16 {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            loop {
                let (socket, _) = listener.accept().await.unwrap();
                tokio::spawn(async move {
                    let (reader, mut writer) = socket.into_split();
                    let mut lines = tokio::io::BufReader::new(reader).lines();
                    writer.write_all(b"220 (vsFTPd 3.0.3)\r\n").await.unwrap();
                    while let Ok(Some(line)) = lines.next_line().await {
                        let reply: &[u8] = if line.starts_with("USER ") {
                            b"331 Please specify the password.\r\n"
                        } else if line == format!("PASS {accept_pass}") {
                            b"230 Login successful.\r\n"
                        } else {
                            tokio::time::sleep(delay).await;
                            b"530 Login incorrect.\r\n"
                        };
                        if writer.write_all(reply).await.is_err() {
                            return;
                        }
                    }
                });
            }
        });
        port
    }

    #[tokio::test]
    async fn ftp_waits_for_a_delayed_rejection() {
        // The 530 arrives well after the settle pause.
        let port = spawn_ftp("secret", Duration::from_millis(300)).await;
        let login = LineLogin::new(Duration::from_secs(2), Duration::from_millis(20));

        assert_eq!(
            login
                .attempt_as(LOCALHOST, port, &Credential::new("admin", "admin"), LoginDialect::Ftp)
                .await,
            LoginAttempt::Rejected
        );
        assert_eq!(
            login
                .attempt_as(LOCALHOST, port, &Credential::new("admin", "secret"), LoginDialect::Ftp)
                .await,
            LoginAttempt::Accepted
        );
    }

    #[tokio::test]
    async fn ftp_without_final_reply_is_not_a_verdict() {
        let port = spawn_ftp("secret", Duration::from_secs(5)).await;
        let login = LineLogin::new(Duration::from_millis(300), Duration::from_millis(20));

        assert_eq!(
            login
                .attempt_as(LOCALHOST, port, &Credential::new("admin", "admin"), LoginDialect::Ftp)
                .await,
            LoginAttempt::Failed(ProbeFailure::Timeout)
        );
    }
}
